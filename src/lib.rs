//! PoiVoice - Nearby Point-of-Interest Announcements
//!
//! Periodically discovers points of interest around the user, announces the
//! closest ones by voice, and keeps a live distance display for one pinned
//! POI up to date as the user moves.

pub mod announcements;
pub mod audio;
pub mod discovery;
pub mod geo;
pub mod i18n;
pub mod location;
pub mod poi;
pub mod session;
pub mod storage;
pub mod tracking;

// Re-export commonly used types
pub use announcements::AnnouncementScheduler;
pub use audio::VoiceAnnouncer;
pub use discovery::DiscoveryEngine;
pub use geo::Position;
pub use session::PoiSession;
pub use storage::config::AppConfig;
pub use tracking::ProximityTracker;
