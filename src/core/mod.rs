pub mod dispatcher;
pub mod labeler;
pub mod session;
