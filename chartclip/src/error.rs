//! Request error taxonomy.
//!
//! Invalid-input variants carry the exact message shown to the requester;
//! acquisition/processing failures keep their cause chain for the logs but
//! surface a generic message (the root cause is internal).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not really sure what song \"{0}\" is. Try one of the suggested titles and don't edit the result!")]
    UnknownSong(String),

    #[error("Not really sure what difficulty \"{0}\" is for this song. Try one of the suggested difficulties!")]
    UnknownDifficulty(String),

    #[error("The bar clip was not formatted correctly. Make sure the beginning and end values are numbers, separated by a hyphen (ex: 4-23).")]
    BadBarClip(String),

    #[error("Bars {start}-{end} fall outside this chart.")]
    RangeOutsideChart { start: u32, end: u32 },

    #[error("Couldn't fetch the chart image, try again later.")]
    Acquisition(#[source] anyhow::Error),

    #[error("Something went wrong processing the chart image.")]
    Processing(#[source] anyhow::Error),
}

impl Error {
    /// Whether the requester caused this (as opposed to an internal failure).
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownSong(_)
                | Self::UnknownDifficulty(_)
                | Self::BadBarClip(_)
                | Self::RangeOutsideChart { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
