// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Criterion benchmarks for [`canopy_bvh`]; see `benches/`.
