// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! GDAL-backed raster access for the `read_geotiff` table function
//!
//! This crate isolates everything that touches GDAL: opening a raster,
//! selecting a band, and reading rectangular windows of samples as
//! `f64`. Consumers program against the [`RasterSource`] trait so the
//! scanning logic can be exercised without raster fixtures.

pub mod config;
pub mod source;

pub use config::set_gdal_cache_mb;
pub use source::{GdalRasterSource, RasterSource};
