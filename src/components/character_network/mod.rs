mod aggregate;
mod component;

pub use component::CharacterNetwork;
