pub mod drain;
pub mod json;
pub mod teams;

pub use drain::{Drain, DrainError, DrainResult};
pub use json::JsonDrain;
pub use teams::card::AdaptiveCardMessage;
pub use teams::{MicrosoftTeamsConfig, MicrosoftTeamsDrain};

pub mod prelude {
    pub use crate::drain::*;
    pub use crate::json::*;
    pub use crate::teams::*;
}
