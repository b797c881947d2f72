// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod random;
mod sink;
mod source;

pub(crate) use random::{
    SEED, random_config, random_transform_of_class, random_variation,
};
pub(crate) use sink::{RecordingSink, Upload};
pub(crate) use source::FixedSource;
