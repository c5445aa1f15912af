use crate::session::SessionManager;
use warp::reply::Json;

/// Live session counts and server counters.
pub fn stats(sessions: &SessionManager) -> Json {
    warp::reply::json(&sessions.stats())
}
