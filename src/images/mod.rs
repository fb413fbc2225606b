//! Image pipeline: hero download and social-share composition.
//!
//! Both halves are best-effort relative to the run. The hero branch degrades
//! to a placeholder path, the social branch to no image at all; neither can
//! abort the run, because the article text is the product and the images are
//! enhancement.
//!
//! # Submodules
//!
//! - [`hero`]: downloads the extracted hero image, normalizing its extension
//!   against an allow-list, with a placeholder fallback
//! - [`social`]: asks the image service for a themed background and
//!   composites a gradient + title overlay onto it

pub mod hero;
pub mod social;

pub use hero::{fetch_hero_image, HeroSource};
pub use social::compose_social_image;
