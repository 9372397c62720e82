pub mod guidance;
pub mod profile;
pub mod recommendation;

pub use guidance::{
    standard_resources, standard_timeline, ConsolidatedRecommendations, GuidanceBundle,
    ResourceCategory, ResourceItem, TimelinePhase,
};
pub use profile::{Profile, ProfileOverrides};
pub use recommendation::{
    normalize_confidence, AdvisorKind, AdvisorResult, RecommendationDomain, RecommendationRecord,
    FALLBACK_CONFIDENCE,
};
