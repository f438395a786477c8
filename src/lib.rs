//! Interactive canvas editing engine for the meme generator.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It draws a
//! background image plus movable, resizable, rotatable text elements onto a
//! `<canvas>`, turns mouse, touch and keyboard input into edits, notifies the
//! host UI through typed events, and exports the composition as an image.
//! Everything except [`web`] is browser-independent and tested natively.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Controller and interaction state machine ([`engine::EngineCore`]) |
//! | [`web`] | Browser shell: `mount`, DOM listeners, frame scheduling, export |
//! | [`element`] | Element geometry, handles, drag/resize/rotate gestures |
//! | [`text`] | Text element: settings, word wrap, autosize, drawing |
//! | [`settings`] | Typed per-element property bags |
//! | [`doc`] | Element store and selection set |
//! | [`input`] | Modifier tracking, touch/mouse arbitration, interaction states |
//! | [`events`] | Typed notifications and the subscriber bus |
//! | [`render`] | Frame rendering to a [`surface::Surface`] |
//! | [`surface`] | Drawing and text-measurement traits |
//! | [`viewport`] | Points, rects, and canvas/display sizing |
//! | [`config`] | Engine configuration |
//! | [`consts`] | Shared numeric and style constants |
//! | [`error`] | Engine error type |

pub mod config;
pub mod consts;
pub mod doc;
pub mod element;
pub mod engine;
pub mod error;
pub mod events;
pub mod input;
pub mod render;
pub mod settings;
pub mod surface;
pub mod text;
pub mod viewport;
pub mod web;

#[cfg(test)]
pub(crate) mod fake_surface;
