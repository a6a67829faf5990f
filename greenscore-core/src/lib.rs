//! greenscore-core: activity categories, quantity extraction, heuristic impact
//! estimation, normalization and the accumulation ledger

pub mod category;
pub mod challenges;
pub mod estimate;
pub mod extract;
pub mod ledger;
pub mod normalize;
pub mod store;

pub use category::{Category, UnknownCategory};
pub use challenges::{Challenge, ChallengeBoard, ChallengeState, CATALOG};
pub use estimate::{estimate, ImpactEstimate, Polarity, Rule, Scale};
pub use extract::{extract_distance_km, extract_duration_hours, extract_quantity, Quantity};
pub use ledger::{FootprintTotals, HistoryEntry, HistoryLedger, Ledger, HISTORY_CAPACITY};
pub use normalize::percentage;
pub use store::{MemoryStore, Store};
