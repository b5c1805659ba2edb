pub mod link;
pub mod resource;
pub mod user;

pub use link::Entity as LinkEntity;
pub use resource::Entity as ResourceEntity;
pub use user::Entity as UserEntity;
