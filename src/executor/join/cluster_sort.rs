// Copyright 2026 Stratum Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Parallel cluster-sort preparation for the sort-merge join
//!
//! Clusters on the least significant bits of the values because the values
//! there are spread far more evenly than in the most significant bits.
//! Equal values therefore land in the same cluster and each cluster can be
//! sorted on its own, while the clusters stay unordered relative to each
//! other. That is enough for the equi join. A non-equi join (`<`, `<=`,
//! `>`, `>=`) has matches beyond cluster borders and needs the
//! concatenation of the clusters to be fully sorted, so clustering falls
//! back to range clustering with sampled split values.
//!
//! Pipeline:
//! 1. Materialize both input columns per chunk (sorted per chunk in the
//!    non-equi case).
//! 2. Radix or range clustering, one worker task per input chunk, appends
//!    under per-cluster locks.
//! 3. Sort every cluster.
//!
//! Radix example with `cluster_count = 4` (2 bits):
//!
//! ```text
//!   000001|01
//!   000000|11
//!          ^ low bits select the cluster
//! ```

use std::cmp::Ordering;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;
use rayon::prelude::*;

use crate::common::scheduler;
use crate::core::{Error, Result};
use crate::storage::Table;

use super::materialize::{
    materialized_size, ClusterValue, ColumnMaterializer, MaterializedColumn,
    MaterializedColumnList,
};

/// Clusters at or above this size are sorted with rayon
const PARALLEL_SORT_THRESHOLD: usize = 50_000;

/// Prepares two join inputs by clustering and sorting one column of each
///
/// Single-shot: `execute` runs the whole pipeline once and returns the
/// clustered, per-cluster-sorted record lists for both sides.
pub struct RadixClusterSorter<T: ClusterValue> {
    input_left: Arc<Table>,
    input_right: Arc<Table>,
    left_column: String,
    right_column: String,
    equi_case: bool,
    cluster_count: usize,
    executed: bool,
    _marker: PhantomData<T>,
}

impl<T: ClusterValue> RadixClusterSorter<T> {
    /// Create a cluster sorter
    ///
    /// `cluster_count` must be a strictly positive power of two. With
    /// `equi_case` the inputs are radix-clustered independently; otherwise
    /// both are range-clustered against shared split values.
    pub fn new(
        input_left: Arc<Table>,
        input_right: Arc<Table>,
        column_names: (impl Into<String>, impl Into<String>),
        equi_case: bool,
        cluster_count: usize,
    ) -> Result<Self> {
        if !cluster_count.is_power_of_two() {
            return Err(Error::InvalidClusterCount(cluster_count));
        }
        Ok(Self {
            input_left,
            input_right,
            left_column: column_names.0.into(),
            right_column: column_names.1.into(),
            equi_case,
            cluster_count,
            executed: false,
            _marker: PhantomData,
        })
    }

    /// Concatenate all chunks into a single chunk
    fn concatenate_chunks(input: MaterializedColumnList<T>) -> MaterializedColumnList<T> {
        let mut output = Vec::with_capacity(materialized_size(&input));
        for chunk in input {
            output.extend(chunk);
        }
        vec![output]
    }

    /// Move every record into the cluster chosen by `clusterer`
    ///
    /// One worker task per input chunk; each appends records under the
    /// destination cluster's lock. Record order inside a cluster after
    /// partitioning is unspecified; the sort stage restores it.
    fn cluster<C>(
        &self,
        input: MaterializedColumnList<T>,
        clusterer: C,
    ) -> Result<MaterializedColumnList<T>>
    where
        C: Fn(&T) -> usize + Clone + Send + 'static,
    {
        let cluster_count = self.cluster_count;
        // Reserve for a uniform distribution; clusters grow past this freely
        let reserved = materialized_size(&input) / cluster_count;
        let output: Arc<Vec<Mutex<MaterializedColumn<T>>>> = Arc::new(
            (0..cluster_count)
                .map(|_| Mutex::new(Vec::with_capacity(reserved)))
                .collect(),
        );

        let input = Arc::new(input);
        let mut jobs = Vec::with_capacity(input.len());
        for chunk_id in 0..input.len() {
            let input = Arc::clone(&input);
            let output = Arc::clone(&output);
            let clusterer = clusterer.clone();
            jobs.push(scheduler::schedule(move || {
                for record in &input[chunk_id] {
                    let cluster_id = clusterer(&record.value);
                    if cluster_id >= cluster_count {
                        return Err(Error::internal(format!(
                            "cluster id {} out of range for {} clusters",
                            cluster_id, cluster_count
                        )));
                    }
                    output[cluster_id].lock().push(record.clone());
                }
                Ok(())
            }));
        }
        scheduler::wait_for(jobs)?;

        let output = Arc::try_unwrap(output)
            .map_err(|_| Error::internal("cluster buffers still shared after barrier"))?;
        Ok(output.into_iter().map(Mutex::into_inner).collect())
    }

    /// Least-significant-bit radix clustering for the equi case
    fn radix_cluster(
        &self,
        input: MaterializedColumnList<T>,
    ) -> Result<MaterializedColumnList<T>> {
        let radix_bitmask = (self.cluster_count - 1) as u32;
        self.cluster(input, move |value: &T| {
            (value.radix() & radix_bitmask) as usize
        })
    }

    /// Collect split-value samples from a materialized (per-chunk sorted) table
    ///
    /// Every chunk can hold values for every cluster, so each chunk is
    /// probed at the positions where the clusters would begin under a
    /// uniform distribution. The samples are aggregated later to pick the
    /// actual cluster borders.
    fn pick_sample_values(&self, samples: &mut [Vec<T>], table: &MaterializedColumnList<T>) {
        for chunk in table {
            if chunk.is_empty() {
                continue;
            }
            for cluster_id in 0..self.cluster_count - 1 {
                let position = chunk.len() * (cluster_id + 1) / self.cluster_count;
                samples[cluster_id].push(chunk[position].value.clone());
            }
        }
    }

    /// Pick the most common sample of each bucket as the split value
    ///
    /// Count ties resolve to the smaller value so the choice is
    /// deterministic.
    fn select_split_values(samples: Vec<Vec<T>>) -> Vec<T> {
        let mut split_values = Vec::with_capacity(samples.len());
        for mut bucket in samples {
            if bucket.is_empty() {
                // Only possible when both inputs are empty; no record will
                // ever consult the splits then
                continue;
            }
            bucket.sort_unstable_by(|a, b| a.total_cmp(b));
            let mut best_value = bucket[0].clone();
            let mut best_count = 0usize;
            let mut run_start = 0;
            while run_start < bucket.len() {
                let mut run_end = run_start + 1;
                while run_end < bucket.len()
                    && bucket[run_end].total_cmp(&bucket[run_start]) == Ordering::Equal
                {
                    run_end += 1;
                }
                if run_end - run_start > best_count {
                    best_count = run_end - run_start;
                    best_value = bucket[run_start].clone();
                }
                run_start = run_end;
            }
            split_values.push(best_value);
        }
        split_values
    }

    /// Range clustering for the non-equi case
    ///
    /// Both inputs contribute samples to shared split values; a split value
    /// is the inclusive end of one range and the start of the next. The
    /// last cluster needs no split value, it takes everything above all
    /// splits. Sorted clusters concatenated in id order are then fully
    /// ordered.
    fn range_cluster(
        &self,
        input_left: MaterializedColumnList<T>,
        input_right: MaterializedColumnList<T>,
    ) -> Result<(MaterializedColumnList<T>, MaterializedColumnList<T>)> {
        let mut samples: Vec<Vec<T>> = vec![Vec::new(); self.cluster_count - 1];
        self.pick_sample_values(&mut samples, &input_left);
        self.pick_sample_values(&mut samples, &input_right);

        let split_values = Arc::new(Self::select_split_values(samples));
        let cluster_count = self.cluster_count;
        let clusterer = {
            let split_values = Arc::clone(&split_values);
            move |value: &T| {
                // First split value greater or equal to the record's value;
                // the splits are in ascending order
                for (cluster_id, split) in split_values.iter().enumerate() {
                    if value.total_cmp(split) != Ordering::Greater {
                        return cluster_id;
                    }
                }
                // Greater than every split value: the last cluster
                cluster_count - 1
            }
        };

        let output_left = self.cluster(input_left, clusterer.clone())?;
        let output_right = self.cluster(input_right, clusterer)?;
        Ok((output_left, output_right))
    }

    /// Sort every cluster in place by value
    fn sort_clusters(clusters: &mut MaterializedColumnList<T>) {
        for cluster in clusters {
            if cluster.len() >= PARALLEL_SORT_THRESHOLD {
                cluster.par_sort_unstable_by(|a, b| a.value.total_cmp(&b.value));
            } else {
                cluster.sort_unstable_by(|a, b| a.value.total_cmp(&b.value));
            }
        }
    }

    /// Run materialization, clustering, and the cluster sort
    pub fn execute(
        &mut self,
    ) -> Result<(MaterializedColumnList<T>, MaterializedColumnList<T>)> {
        if self.executed {
            return Err(Error::OperatorAlreadyExecuted("RadixClusterSorter".into()));
        }
        self.executed = true;

        // The non-equi case needs sorted chunks for split-value sampling
        let materializer: ColumnMaterializer<T> = ColumnMaterializer::new(!self.equi_case);
        let chunks_left = materializer.materialize(&self.input_left, &self.left_column)?;
        let chunks_right = materializer.materialize(&self.input_right, &self.right_column)?;

        let (mut output_left, mut output_right) = if self.cluster_count == 1 {
            (
                Self::concatenate_chunks(chunks_left),
                Self::concatenate_chunks(chunks_right),
            )
        } else if self.equi_case {
            (
                self.radix_cluster(chunks_left)?,
                self.radix_cluster(chunks_right)?,
            )
        } else {
            self.range_cluster(chunks_left, chunks_right)?
        };

        Self::sort_clusters(&mut output_left);
        Self::sort_clusters(&mut output_right);

        debug_assert_eq!(
            materialized_size(&output_left),
            self.input_left.row_count(),
            "left output has wrong size"
        );
        debug_assert_eq!(
            materialized_size(&output_right),
            self.input_right.row_count(),
            "right output has wrong size"
        );

        Ok((output_left, output_right))
    }
}
