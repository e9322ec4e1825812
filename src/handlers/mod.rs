pub mod protected;
pub mod resources;
pub mod token;
pub mod users;
