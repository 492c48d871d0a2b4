//=========================================================================
// Platform Bridge
//=========================================================================
//
// Bridges platform backends (winit/headless) with the core shell.
//
// This module defines the contract between platform implementations and
// core logic, so backends can be swapped without touching the surface,
// router or frame loop.
//
// Components:
// - `interface`: traits, configuration and error types (the contract)
//
//=========================================================================

//=== Module Declarations =================================================

pub mod interface;

//=== Public API ==========================================================

pub use interface::{
    ClearColor, ContextConfig, ContextProfile, EventSource, GraphicsRequirements,
    GraphicsVersion, Platform, SurfaceError, WindowConfig,
};
