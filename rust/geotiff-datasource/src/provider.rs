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

use std::{any::Any, sync::Arc};

use arrow_schema::SchemaRef;
use async_trait::async_trait;
use datafusion::{
    catalog::{Session, TableProvider},
    common::{plan_err, Result},
    datasource::TableType,
    physical_plan::ExecutionPlan,
    prelude::Expr,
};

use crate::{exec::GeoTiffScanExec, options::read_geotiff_schema, GeoTiffReadOptions};

/// Table over one band of a raster file
///
/// Carries only the bound path and options; no I/O happens until the
/// plan executes. Each scan opens its own dataset handle, so the same
/// provider can appear in several plan branches.
#[derive(Debug)]
pub struct GeoTiffTableProvider {
    path: String,
    options: GeoTiffReadOptions,
    schema: SchemaRef,
}

impl GeoTiffTableProvider {
    pub fn try_new(path: String, options: GeoTiffReadOptions) -> Result<Self> {
        if options.band < 1 {
            return plan_err!("read_geotiff: band must be >= 1, got {}", options.band);
        }
        Ok(Self {
            path,
            options,
            schema: read_geotiff_schema(),
        })
    }

    pub fn options(&self) -> &GeoTiffReadOptions {
        &self.options
    }
}

#[async_trait]
impl TableProvider for GeoTiffTableProvider {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn table_type(&self) -> TableType {
        TableType::Base
    }

    async fn scan(
        &self,
        _state: &dyn Session,
        projection: Option<&Vec<usize>>,
        _filters: &[Expr],
        limit: Option<usize>,
    ) -> Result<Arc<dyn ExecutionPlan>> {
        Ok(Arc::new(GeoTiffScanExec::try_new(
            self.path.clone(),
            self.options.clone(),
            projection,
            limit,
        )?))
    }
}
