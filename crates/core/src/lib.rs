// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 iOS Tunnel Manager Contributors

// iOS Tunnel Manager - Core Library
// Privileged launch, log watching, and termination of the device tunnel

pub mod elevate;
pub mod handle;
pub mod launch;
pub mod poll;
pub mod shell;
pub mod terminate;
pub mod watch;

pub use elevate::{default_elevator, Elevator, OsascriptElevator, PkexecElevator};
pub use handle::TunnelHandle;
pub use launch::Launcher;
pub use terminate::{StopOutcome, Terminator};
pub use watch::{LogSink, LogWatcher, TracingLogSink};
