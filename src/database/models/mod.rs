pub mod comment;
pub mod like;
pub mod playlist;
pub mod subscription;
pub mod tweet;
pub mod video;

pub use comment::Comment;
pub use like::Like;
pub use playlist::Playlist;
pub use subscription::Subscription;
pub use tweet::Tweet;
pub use video::Video;
