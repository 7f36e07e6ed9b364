// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runnable demos for [`canopy_bvh`].
//!
//! See the `examples/` directory of this package:
//! - `bvh_basics`: build a small tree, query it, cast a ray.
//! - `bvh_bounce`: bouncing boxes showing the fat-box hysteresis rate.
//! - `bvh_churn`: a long random insert/remove/update soak.
