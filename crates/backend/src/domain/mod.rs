pub mod a001_post;
pub mod a002_user;
pub mod a003_term;
pub mod a004_comment;
