//! Pipeline stages for the decision/assembly layer.
//!
//! Each submodule implements exactly one stage; keeping stages separate makes
//! each independently testable and keeps every stage a pure function of its
//! inputs plus the configuration.
//!
//! ## Data Flow (per request)
//!
//! ```text
//! request ──▶ paginate ──▶ per page: corruption ──▶ mode ──┬▶ imaging + tables + assemble
//!             (gate)       (trust score)   (text | image)  └▶ page-raster passthrough
//! ```
//!
//! 1. [`paginate`]   — validate the range against the caps; oversized requests
//!    get a batch plan instead of execution
//! 2. [`corruption`] — score the trustworthiness of the page's extracted text
//! 3. [`mode`]       — the single point deciding block assembly vs. page image
//! 4. [`imaging`]    — exclusion predicates, downscaling, raster processing
//! 5. [`tables`]     — cell grids serialized to single markdown blocks
//! 6. [`assemble`]   — geometric reading-order merge of all artifact kinds

pub mod assemble;
pub mod corruption;
pub mod imaging;
pub mod mode;
pub mod paginate;
pub mod tables;
