// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use crate::{UniformHandle, UniformSink};

/// A single uniform upload.
#[derive(Clone, Copy, PartialEq, Debug)]
pub(crate) enum Upload {
    F1(UniformHandle, f32),
    F2(UniformHandle, [f32; 2]),
    F3(UniformHandle, [f32; 3]),
    F4(UniformHandle, [f32; 4]),
    Matrix3(UniformHandle, [f32; 9]),
}

impl Upload {
    pub(crate) fn handle(&self) -> UniformHandle {
        match *self {
            Self::F1(handle, _)
            | Self::F2(handle, _)
            | Self::F3(handle, _)
            | Self::F4(handle, _)
            | Self::Matrix3(handle, _) => handle,
        }
    }
}

/// Records uploads instead of talking to a GPU.
#[derive(Default, Debug)]
pub(crate) struct RecordingSink {
    pub(crate) uploads: Vec<Upload>,
}

impl RecordingSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the uploads recorded so far and forgets them.
    pub(crate) fn take(&mut self) -> Vec<Upload> {
        core::mem::take(&mut self.uploads)
    }
}

impl UniformSink for RecordingSink {
    fn set_1f(&mut self, handle: UniformHandle, x: f32) {
        self.uploads.push(Upload::F1(handle, x));
    }

    fn set_2f(&mut self, handle: UniformHandle, x: f32, y: f32) {
        self.uploads.push(Upload::F2(handle, [x, y]));
    }

    fn set_3f(&mut self, handle: UniformHandle, x: f32, y: f32, z: f32) {
        self.uploads.push(Upload::F3(handle, [x, y, z]));
    }

    fn set_4fv(&mut self, handle: UniformHandle, value: &[f32; 4]) {
        self.uploads.push(Upload::F4(handle, *value));
    }

    fn set_matrix3f(&mut self, handle: UniformHandle, matrix: &[f32; 9]) {
        self.uploads.push(Upload::Matrix3(handle, *matrix));
    }
}
