// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Events that processes can notify and listen on.

pub mod once;
pub mod repeated;
