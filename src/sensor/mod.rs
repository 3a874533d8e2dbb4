pub mod fetcher;
pub mod poll;
pub mod state;

pub use fetcher::{Fetch, FetchError, FetchErrorKind, HttpFetcher};
pub use poll::{PollHandle, PollLoop};
pub use state::StateStore;
