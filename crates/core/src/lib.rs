pub mod error;
pub mod model;
pub mod request;
pub mod score;
pub mod trace;

pub use error::ScreenError;
pub use model::{
    Address, Affiliation, AircraftInfo, BusinessInfo, ContactInfo, CryptoAddress, Entity,
    EntityKind, GovernmentId, HistoricalEntry, IdKind, OrganizationInfo, PersonInfo,
    PreparedFields, SanctionsInfo, SourceList, VesselInfo,
};
pub use request::{new_request_id, SearchRequest, SearchResponse, SearchResult};
pub use score::{PieceKind, RiskLevel, ScoreBreakdown, ScorePiece};
pub use trace::{ScoringTrace, TraceEvent, TracePhase};

pub const PROJECT_NAME: &str = "watchgate";
pub const PROJECT_VERSION: &str = env!("CARGO_PKG_VERSION");
