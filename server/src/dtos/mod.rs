//! DTOs module - Data Transfer Objects
//!
//! DTOs keep the API representation separate from the entities.

pub mod message;
pub mod profile;
pub mod property;
pub mod query;
pub mod user;

// Re-exports
pub use message::{ConversationSummaryDTO, CreateMessageDTO, MessageDTO, SendMessageDTO, ThreadDTO};
pub use profile::{ProfileDTO, SettingsDTO, UpdateProfileDTO, UpdateSettingsDTO};
pub use property::{
    CreatePropertyDTO, DeletePropertyDTO, FavoriteDTO, HomeDTO, ImageUploadDTO, PropertyDTO,
    PropertyDetailDTO, PropertyFormDTO, PropertyListDTO,
};
pub use query::PropertyListQuery;
pub use user::{
    CreateUserDTO, LoginDTO, LoginResponseDTO, PasswordResetConfirmDTO, PasswordResetTokenDTO,
    PasswordResetVerifyDTO, RegisterDTO, SetPasswordDTO, UpdateUserDTO, UserDTO,
};
