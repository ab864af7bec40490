pub mod user;

pub use user::{
    CreateUsersResult, DeleteUsersRequest, DeleteUsersResult, NewUser, UpdateUsersResult, User,
    UserUpdate,
};
