pub mod comment_dtos;
pub mod post_dtos;
pub mod upload_dtos;
