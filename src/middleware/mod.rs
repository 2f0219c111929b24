pub mod user_id;
