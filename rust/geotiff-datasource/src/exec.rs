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
use datafusion::common::{internal_err, project_schema, Result};
use datafusion::execution::context::TaskContext;
use datafusion::physical_expr::EquivalenceProperties;
use datafusion::physical_plan::execution_plan::{Boundedness, EmissionType};
use datafusion::physical_plan::stream::RecordBatchStreamAdapter;
use datafusion::physical_plan::{
    DisplayAs, DisplayFormatType, ExecutionPlan, Partitioning, PlanProperties,
    SendableRecordBatchStream,
};
use geotiff_gdal::{set_gdal_cache_mb, GdalRasterSource};

use crate::{options::read_geotiff_schema, scan::CellBatchIter, GeoTiffReadOptions};

/// Leaf plan that streams one raster band as `(cell_id, value)` rows
///
/// Strictly single-partition: cell ids are assigned sequentially while
/// consuming the row window, so the scan must not be split. Opening the
/// dataset and allocating the window happen in [`execute`], not at plan
/// time; a failed open surfaces when the plan runs, and a plan that is
/// never executed does no I/O.
///
/// [`execute`]: ExecutionPlan::execute
#[derive(Debug)]
pub struct GeoTiffScanExec {
    path: String,
    options: GeoTiffReadOptions,
    projection: Arc<[usize]>,
    projected_schema: SchemaRef,
    limit: Option<usize>,
    properties: PlanProperties,
}

impl GeoTiffScanExec {
    pub fn try_new(
        path: String,
        options: GeoTiffReadOptions,
        projection: Option<&Vec<usize>>,
        limit: Option<usize>,
    ) -> Result<Self> {
        let schema = read_geotiff_schema();
        let projected_schema = project_schema(&schema, projection)?;
        let projection: Arc<[usize]> = match projection {
            Some(indices) => Arc::from(indices.clone()),
            None => Arc::from((0..schema.fields().len()).collect::<Vec<_>>()),
        };

        let properties = PlanProperties::new(
            EquivalenceProperties::new(projected_schema.clone()),
            Partitioning::UnknownPartitioning(1),
            EmissionType::Incremental,
            Boundedness::Bounded,
        );

        Ok(Self {
            path,
            options,
            projection,
            projected_schema,
            limit,
            properties,
        })
    }
}

impl DisplayAs for GeoTiffScanExec {
    fn fmt_as(&self, _t: DisplayFormatType, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "GeoTiffScanExec: path={}, band={}",
            self.path, self.options.band
        )?;
        if let Some(limit) = self.limit {
            write!(f, ", limit={limit}")?;
        }
        Ok(())
    }
}

impl ExecutionPlan for GeoTiffScanExec {
    fn name(&self) -> &str {
        "GeoTiffScanExec"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn schema(&self) -> SchemaRef {
        self.projected_schema.clone()
    }

    fn properties(&self) -> &PlanProperties {
        &self.properties
    }

    fn children(&self) -> Vec<&Arc<dyn ExecutionPlan>> {
        Vec::new()
    }

    fn with_new_children(
        self: Arc<Self>,
        _children: Vec<Arc<dyn ExecutionPlan>>,
    ) -> Result<Arc<dyn ExecutionPlan>> {
        Ok(self)
    }

    fn execute(
        &self,
        partition: usize,
        context: Arc<TaskContext>,
    ) -> Result<SendableRecordBatchStream> {
        if partition != 0 {
            return internal_err!("GeoTiffScanExec has a single partition, got {partition}");
        }

        // The block cache budget is process-wide GDAL state; apply it
        // before the dataset is opened. Concurrent scans that disagree
        // on the value race, last write wins.
        if self.options.cache_mb > 0 {
            set_gdal_cache_mb(self.options.cache_mb)?;
        }

        let source = GdalRasterSource::open(&self.path, self.options.band as usize)?;
        let iter = CellBatchIter::new(
            Box::new(source),
            self.options.target_mb,
            self.projection.clone(),
            context.session_config().batch_size(),
            self.limit,
        );

        Ok(Box::pin(RecordBatchStreamAdapter::new(
            self.projected_schema.clone(),
            futures::stream::iter(iter),
        )))
    }
}
