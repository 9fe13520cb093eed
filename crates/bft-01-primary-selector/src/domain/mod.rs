//! Domain layer for primary selection.

pub mod declarations;
pub mod primary;
pub mod round_robin;

pub use declarations::{CandidateDeclaration, DeclarationTally};
pub use primary::{PrimaryRecord, PrimarySource};
pub use round_robin::{base_rank, compute_fallback_primary, select_rank};
