//! Online selectors
//!
//! Each algorithm owns auxiliary state that persists across successive
//! update calls so incremental maintenance stays cheaper than recomputing
//! from scratch. The state travels opaquely with the inducing set through
//! the dispatcher (see `api::SelectionState`).

pub mod oips;
pub mod seqdpp;
pub mod streamkmeans;
pub mod unigrid;
pub mod webscale;

pub use self::oips::OIPS;
pub use self::seqdpp::SeqDPP;
pub use self::streamkmeans::StreamKmeans;
pub use self::unigrid::UniGrid;
pub use self::webscale::Webscale;
