//! Statistical grid classification and connected-component clustering.
//!
//! [`GridAnalyzer`] owns a dense 2D board of accumulated sample values plus a
//! per-cell classification cache. Clustering proceeds in three phases:
//!
//! 1. **Flood fill**: every strong cell (value at or above the strong
//!    threshold) is networked with other strong cells within the Euclidean
//!    `reach` radius, depth-first over an explicit work list.
//! 2. **Padding**: once all fills are complete, each cluster is extended with
//!    weak cells found within `reach` of its strong members. Padding must not
//!    interleave with the fills: a padding probe can classify cells that a
//!    later fill would otherwise claim.
//! 3. **Sub-clustering**: each padded cluster is re-gridded on a fresh child
//!    analyzer and re-clustered recursively, splitting it when its own value
//!    distribution supports tighter structure.
//!
//! Classification is memoized: once a cell's label leaves `Unchecked` it is
//! terminal for the lifetime of the analyzer, which makes `cluster()`
//! deterministic and repeatable.

use std::collections::BTreeSet;

use log::debug;

use crate::config::AnalysisConfig;
use crate::processors::cluster::Cluster;
use crate::processors::threshold::{GridStats, Thresholds};

/// Minimum member count before a cluster is considered for subdivision.
const MIN_SUB_CLUSTER_MEMBERS: usize = 6;

/// Per-cell classification state.
///
/// Ordering matters: labels only ever increase, and anything above
/// `Unchecked` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum PointLabel {
    /// No input data ever reached this cell; its value is not trustworthy.
    Uninitialized,
    /// Holds loaded data but has not been classified yet.
    Unchecked,
    /// At or below the weak threshold; never part of any cluster.
    Ignorable,
    /// Above the weak threshold (possibly via neighbor assist); cluster padding.
    Weak,
    /// At or above the strong threshold; a core cluster member.
    Strong,
}

/// Explicit classification cache, one label per board cell.
///
/// The classification predicates mutate this through `&mut self` on the
/// analyzer; there is no interior mutability. Labels tighten monotonically
/// from `Unchecked` toward a terminal state and are never recomputed.
#[derive(Debug, Clone)]
struct LabelCache {
    labels: Vec<PointLabel>,
}

impl LabelCache {
    fn new(cells: usize) -> Self {
        Self {
            labels: vec![PointLabel::Uninitialized; cells],
        }
    }

    #[inline]
    fn get(&self, index: usize) -> PointLabel {
        self.labels[index]
    }

    #[inline]
    fn set(&mut self, index: usize, label: PointLabel) {
        self.labels[index] = label;
    }

    fn classified(&self) -> usize {
        self.labels
            .iter()
            .filter(|&&label| label >= PointLabel::Ignorable)
            .count()
    }
}

/// The clustering engine.
///
/// An analyzer is parameterized once at construction and then loaded with
/// one dataset at a time. Loading is fail-closed: invalid input leaves the
/// analyzer indistinguishable from a freshly constructed one.
#[derive(Debug, Clone)]
pub struct GridAnalyzer {
    board: Vec<f32>,
    cache: LabelCache,
    width: usize,
    height: usize,
    thresholds: Option<Thresholds>,
    config: AnalysisConfig,
}

impl GridAnalyzer {
    /// Creates an empty analyzer with the given parameters.
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            board: Vec::new(),
            cache: LabelCache::new(0),
            width: 0,
            height: 0,
            thresholds: None,
            config,
        }
    }

    /// Loads a dataset of parallel coordinate/value arrays into a fresh
    /// `width` x `height` board and derives the significance thresholds.
    ///
    /// Returns false (leaving the analyzer empty) when the arrays have
    /// mismatched lengths, are empty, or contain a coordinate outside the
    /// declared dimensions. Multiple samples landing on one cell accumulate;
    /// non-finite values are silently dropped.
    ///
    /// Degenerate statistics (a single initialized cell, or a non-finite
    /// standard deviation) are not a load failure: the board is reset so
    /// that [`cluster`](Self::cluster) yields no clusters, and true is
    /// still returned.
    pub fn load(
        &mut self,
        xs: &[usize],
        ys: &[usize],
        values: &[f32],
        width: usize,
        height: usize,
    ) -> bool {
        self.reset();

        if xs.len() != ys.len() || xs.len() != values.len() || xs.is_empty() {
            return false;
        }
        if xs.iter().any(|&x| x >= width) || ys.iter().any(|&y| y >= height) {
            return false;
        }

        self.width = width;
        self.height = height;
        self.board = vec![0.0; width * height];
        self.cache = LabelCache::new(width * height);

        for ((&x, &y), &value) in xs.iter().zip(ys).zip(values) {
            if value.is_finite() {
                let index = self.index(x, y);
                self.board[index] += value;
                self.cache.set(index, PointLabel::Unchecked);
            }
        }

        self.analyze();
        true
    }

    /// Loads a cluster's members as a fresh dataset at the given dimensions.
    ///
    /// Used by the sub-clustering recursion; the cluster is treated as a raw
    /// sample set and goes through the same validation as [`load`](Self::load).
    pub fn load_cluster(&mut self, cluster: &Cluster, width: usize, height: usize) -> bool {
        let mut xs = Vec::with_capacity(cluster.len());
        let mut ys = Vec::with_capacity(cluster.len());
        let mut values = Vec::with_capacity(cluster.len());

        for member in cluster.members() {
            xs.push(member.x);
            ys.push(member.y);
            values.push(member.value);
        }

        self.load(&xs, &ys, &values, width, height)
    }

    /// Returns true if a dataset is currently loaded.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        !self.board.is_empty()
    }

    /// Board width in cells (0 when empty).
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Board height in cells (0 when empty).
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The thresholds derived from the current dataset, if any.
    #[inline]
    pub fn thresholds(&self) -> Option<Thresholds> {
        self.thresholds
    }

    /// Accumulated value at a cell, or `None` when out of bounds.
    pub fn value_at(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.board[y * self.width + x])
        } else {
            None
        }
    }

    /// Groups the board's significant cells into clusters.
    ///
    /// Deterministic: the scan is row-major and repeated calls on unchanged
    /// state return clusters with identical membership.
    pub fn cluster(&mut self) -> Vec<Cluster> {
        let thresholds = match self.thresholds {
            Some(thresholds) => thresholds,
            None => return Vec::new(),
        };

        let mut visited = vec![false; self.board.len()];
        let mut clusters = Vec::new();

        for y in 0..self.height {
            for x in 0..self.width {
                let index = self.index(x, y);
                let label = self.cache.get(index);
                let seedable = label == PointLabel::Unchecked || label == PointLabel::Strong;
                if !seedable || visited[index] {
                    continue;
                }

                let mut cluster = Cluster::new();
                self.find_strong_points(x, y, thresholds, &mut visited, &mut cluster);

                if !cluster.is_empty() {
                    debug!(
                        "cluster found: seed=({x}, {y}) strong_members={} depth={}",
                        cluster.len(),
                        self.config.sub_cluster_depth
                    );
                    clusters.push(cluster);
                }
            }
        }

        for cluster in &mut clusters {
            self.pad_cluster(thresholds, cluster);
        }

        let mut refined = Vec::new();
        for cluster in clusters {
            refined.extend(self.sub_cluster(cluster));
        }
        refined
    }

    /// Derives the thresholds from the loaded board. A board of one cell or
    /// fewer is left unanalyzed; degenerate statistics reset the board so
    /// that clustering yields the defined empty result.
    fn analyze(&mut self) {
        if self.width * self.height <= 1 {
            return;
        }

        let mut stats = GridStats::new();
        for index in 0..self.board.len() {
            if self.cache.get(index) != PointLabel::Uninitialized {
                stats.record(self.board[index]);
            }
        }

        match self
            .config
            .threshold_model
            .strategy()
            .compute(&stats, &self.config)
        {
            Some(thresholds) => {
                debug!(
                    "thresholds computed: strong={:.4} weak={:.4} weak_assist={:.4} cells={} depth={}",
                    thresholds.strong,
                    thresholds.weak,
                    thresholds.weak_assist,
                    stats.count(),
                    self.config.sub_cluster_depth
                );
                self.thresholds = Some(thresholds);
            }
            None => {
                debug!(
                    "degenerate statistics over {} cells, resetting board",
                    stats.count()
                );
                self.reset();
            }
        }
    }

    fn reset(&mut self) {
        self.board.clear();
        self.cache = LabelCache::new(0);
        self.width = 0;
        self.height = 0;
        self.thresholds = None;
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    fn is_uninitialized(&self, x: usize, y: usize) -> bool {
        self.cache.get(self.index(x, y)) == PointLabel::Uninitialized
    }

    #[inline]
    fn been_checked(&self, x: usize, y: usize) -> bool {
        self.cache.get(self.index(x, y)) > PointLabel::Unchecked
    }

    /// True when the cell can never contribute to a cluster.
    ///
    /// Uninitialized cells are ignorable without being labeled; their value
    /// is not trustworthy.
    fn is_ignorable(&mut self, x: usize, y: usize, thresholds: Thresholds) -> bool {
        if self.is_uninitialized(x, y) {
            return true;
        }

        let index = self.index(x, y);
        if self.been_checked(x, y) {
            return self.cache.get(index) == PointLabel::Ignorable;
        }

        if self.board[index] <= thresholds.weak {
            self.cache.set(index, PointLabel::Ignorable);
            return true;
        }

        false
    }

    /// True when the cell's value meets the strong threshold.
    ///
    /// A cell that is neither ignorable nor strong keeps its `Unchecked`
    /// label; it may still qualify as weak during padding.
    fn is_strong(&mut self, x: usize, y: usize, thresholds: Thresholds) -> bool {
        if self.been_checked(x, y) {
            return self.cache.get(self.index(x, y)) == PointLabel::Strong;
        }

        if self.is_ignorable(x, y, thresholds) {
            return false;
        }

        let index = self.index(x, y);
        if self.board[index] >= thresholds.strong {
            self.cache.set(index, PointLabel::Strong);
            return true;
        }

        false
    }

    /// True when the cell qualifies as cluster padding, either on its own
    /// value or with the neighbor-assist bonus.
    ///
    /// Callers must rule out uninitialized cells first; without context this
    /// predicate cannot answer for them.
    fn is_weak(&mut self, x: usize, y: usize, thresholds: Thresholds) -> bool {
        if self.been_checked(x, y) {
            return self.cache.get(self.index(x, y)) == PointLabel::Weak;
        }

        let index = self.index(x, y);
        if self.board[index] > thresholds.weak {
            self.cache.set(index, PointLabel::Weak);
            return true;
        }

        let assisted = f64::from(self.board[index])
            + self.strong_neighbor_weight(x, y, thresholds) * f64::from(thresholds.weak_assist);
        let qualifies = assisted >= f64::from(thresholds.weak);

        if qualifies {
            self.cache.set(index, PointLabel::Weak);
        }

        qualifies
    }

    /// Sums `1/distance` over the strong cells in the immediate
    /// 8-neighborhood, weighting orthogonal neighbors over diagonal ones.
    fn strong_neighbor_weight(&mut self, x: usize, y: usize, thresholds: Thresholds) -> f64 {
        let mut weight = 0.0;

        let x_start = if x > 0 { -1 } else { 0 };
        let y_start = if y > 0 { -1 } else { 0 };
        let x_end = if x + 1 < self.width { 1 } else { 0 };
        let y_end = if y + 1 < self.height { 1 } else { 0 };

        for dy in y_start..=y_end {
            for dx in x_start..=x_end {
                if dx == 0 && dy == 0 {
                    continue;
                }

                let nx = (x as i64 + dx) as usize;
                let ny = (y as i64 + dy) as usize;
                if self.is_strong(nx, ny, thresholds) {
                    weight += 1.0 / f64::hypot(dx as f64, dy as f64);
                }
            }
        }

        weight
    }

    /// In-bounds neighbors of `(x, y)` strictly within the `reach` radius.
    fn reach_neighbors(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let reach = f64::from(self.config.reach);
        let span = self.config.reach as i64;

        let mut neighbors = Vec::new();
        for dy in -span..=span {
            for dx in -span..=span {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if f64::hypot(dx as f64, dy as f64) >= reach {
                    continue;
                }

                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
                    continue;
                }

                neighbors.push((nx as usize, ny as usize));
            }
        }

        neighbors
    }

    /// Depth-first flood fill over an explicit work list, collecting the
    /// strong cells reachable from the seed through `reach`-radius steps.
    fn find_strong_points(
        &mut self,
        seed_x: usize,
        seed_y: usize,
        thresholds: Thresholds,
        visited: &mut [bool],
        cluster: &mut Cluster,
    ) {
        let mut pending = vec![(seed_x, seed_y)];

        while let Some((x, y)) = pending.pop() {
            let index = self.index(x, y);
            if visited[index] {
                continue;
            }

            let label = self.cache.get(index);
            if label == PointLabel::Ignorable || label == PointLabel::Weak {
                continue;
            }
            visited[index] = true;

            if !self.is_strong(x, y, thresholds) {
                continue;
            }

            cluster.add_member(x, y, self.board[index]);

            for (nx, ny) in self.reach_neighbors(x, y) {
                let neighbor_index = self.index(nx, ny);
                let neighbor_label = self.cache.get(neighbor_index);
                let expandable = neighbor_label == PointLabel::Unchecked
                    || neighbor_label == PointLabel::Strong;
                if expandable && !visited[neighbor_index] {
                    pending.push((nx, ny));
                }
            }
        }
    }

    /// Extends a cluster with the weak cells within `reach` of its strong
    /// members. Candidates are deduplicated and tested in (x, y) order so
    /// padding order is reproducible.
    fn pad_cluster(&mut self, thresholds: Thresholds, cluster: &mut Cluster) {
        let strong: BTreeSet<(usize, usize)> =
            cluster.members().iter().map(|m| (m.x, m.y)).collect();

        let mut candidates = BTreeSet::new();
        for &(x, y) in &strong {
            for neighbor in self.reach_neighbors(x, y) {
                if !strong.contains(&neighbor) {
                    candidates.insert(neighbor);
                }
            }
        }

        for (x, y) in candidates {
            if !self.is_uninitialized(x, y) && self.is_weak(x, y, thresholds) {
                let index = self.index(x, y);
                cluster.add_member(x, y, self.board[index]);
            }
        }
    }

    /// Attempts to decompose a cluster by re-running the full analysis on
    /// its members alone, re-gridded at the parent's dimensions.
    ///
    /// Subdivision requires at least [`MIN_SUB_CLUSTER_MEMBERS`] members,
    /// strictly fewer members than the board's classified-cell population
    /// (the structural defense against non-terminating recursion), and a
    /// remaining depth budget. A recursion that yields nothing keeps the
    /// original cluster whole.
    fn sub_cluster(&self, cluster: Cluster) -> Vec<Cluster> {
        let classified = self.cache.classified();
        let budget = self.config.sub_cluster_depth;

        if cluster.len() < MIN_SUB_CLUSTER_MEMBERS || cluster.len() >= classified || budget == 0 {
            debug!(
                "keeping cluster whole: members={} classified={} depth={budget}",
                cluster.len(),
                classified
            );
            return vec![cluster];
        }

        debug!(
            "sub-cluster attempt: members={} classified={} depth={budget}",
            cluster.len(),
            classified
        );

        let mut child_config = self.config.clone();
        child_config.sub_cluster_depth = budget - 1;

        let mut child = GridAnalyzer::new(child_config);
        if !child.load_cluster(&cluster, self.width, self.height) {
            return vec![cluster];
        }

        let sub_clusters = child.cluster();
        if sub_clusters.is_empty() {
            vec![cluster]
        } else {
            debug!(
                "sub-cluster split {} members into {} clusters at depth {budget}",
                cluster.len(),
                sub_clusters.len()
            );
            sub_clusters
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(upper: f32, lower: f32, padding: f32, reach: f32) -> AnalysisConfig {
        AnalysisConfig {
            upper_sensitivity: upper,
            lower_sensitivity: lower,
            padding_level: padding,
            reach,
            ..AnalysisConfig::default()
        }
    }

    /// Full 5x5 board, all zero except a single hot cell at (2, 2).
    fn single_peak_analyzer() -> GridAnalyzer {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        let mut values = Vec::new();
        for y in 0..5 {
            for x in 0..5 {
                xs.push(x);
                ys.push(y);
                values.push(if x == 2 && y == 2 { 100.0 } else { 0.0 });
            }
        }

        let mut analyzer = GridAnalyzer::new(config(1.0, 1.0, 0.0, 1.5));
        assert!(analyzer.load(&xs, &ys, &values, 5, 5));
        analyzer
    }

    fn membership(cluster: &Cluster) -> BTreeSet<(usize, usize)> {
        cluster.members().iter().map(|m| (m.x, m.y)).collect()
    }

    #[test]
    fn test_load_rejects_mismatched_lengths() {
        let mut analyzer = GridAnalyzer::new(AnalysisConfig::default());
        assert!(!analyzer.load(&[0, 1], &[0], &[1.0, 2.0], 4, 4));
        assert!(!analyzer.is_loaded());
        assert!(analyzer.thresholds().is_none());
    }

    #[test]
    fn test_load_rejects_empty_input() {
        let mut analyzer = GridAnalyzer::new(AnalysisConfig::default());
        assert!(!analyzer.load(&[], &[], &[], 4, 4));
        assert!(!analyzer.is_loaded());
    }

    #[test]
    fn test_load_rejects_out_of_bounds() {
        let mut analyzer = GridAnalyzer::new(AnalysisConfig::default());
        assert!(!analyzer.load(&[4], &[0], &[1.0], 4, 4));
        assert!(!analyzer.load(&[0], &[7], &[1.0], 4, 4));
        assert!(!analyzer.is_loaded());
    }

    #[test]
    fn test_failed_load_resets_previous_state() {
        let mut analyzer = single_peak_analyzer();
        assert!(analyzer.is_loaded());

        assert!(!analyzer.load(&[9], &[9], &[1.0], 3, 3));
        assert!(!analyzer.is_loaded());
        assert_eq!(analyzer.width(), 0);
        assert!(analyzer.thresholds().is_none());
        assert!(analyzer.cluster().is_empty());
    }

    #[test]
    fn test_non_finite_values_dropped() {
        let mut analyzer = GridAnalyzer::new(AnalysisConfig::default());
        assert!(analyzer.load(
            &[0, 0, 0],
            &[0, 0, 0],
            &[f32::NAN, 5.0, f32::INFINITY],
            1,
            1
        ));
        assert_eq!(analyzer.value_at(0, 0), Some(5.0));
    }

    #[test]
    fn test_samples_accumulate() {
        let mut analyzer = GridAnalyzer::new(AnalysisConfig::default());
        assert!(analyzer.load(
            &[1, 1, 0],
            &[1, 1, 0],
            &[2.0, 3.0, 1.0],
            2,
            2
        ));
        assert_eq!(analyzer.value_at(1, 1), Some(5.0));
        assert_eq!(analyzer.value_at(0, 0), Some(1.0));
    }

    #[test]
    fn test_single_cell_grid_never_analyzes() {
        let mut analyzer = GridAnalyzer::new(AnalysisConfig::default());
        assert!(analyzer.load(&[0], &[0], &[42.0], 1, 1));
        assert!(analyzer.is_loaded());
        assert!(analyzer.thresholds().is_none());
        assert!(analyzer.cluster().is_empty());
    }

    #[test]
    fn test_degenerate_single_initialized_cell_resets() {
        // A 2x2 board with one initialized cell has an undefined sample
        // variance; the board resets and clustering yields nothing.
        let mut analyzer = GridAnalyzer::new(AnalysisConfig::default());
        assert!(analyzer.load(&[0], &[0], &[42.0], 2, 2));
        assert!(!analyzer.is_loaded());
        assert!(analyzer.cluster().is_empty());
    }

    #[test]
    fn test_identical_values_yield_no_clusters() {
        let xs: Vec<usize> = (0..9).map(|i| i % 3).collect();
        let ys: Vec<usize> = (0..9).map(|i| i / 3).collect();
        let values = vec![7.0; 9];

        let mut analyzer = GridAnalyzer::new(config(1.0, 1.0, 0.0, 1.5));
        assert!(analyzer.load(&xs, &ys, &values, 3, 3));
        assert!(analyzer.cluster().is_empty());
    }

    #[test]
    fn test_classification_is_memoized() {
        let mut analyzer = single_peak_analyzer();
        let thresholds = analyzer.thresholds().unwrap();

        assert!(analyzer.is_strong(2, 2, thresholds));
        let labels_after_first = analyzer.cache.labels.clone();

        assert!(analyzer.is_strong(2, 2, thresholds));
        assert_eq!(analyzer.cache.labels, labels_after_first);

        assert!(analyzer.is_ignorable(0, 0, thresholds));
        assert!(analyzer.is_ignorable(0, 0, thresholds));
        assert!(!analyzer.is_strong(0, 0, thresholds));
        assert_eq!(
            analyzer.cache.get(analyzer.index(0, 0)),
            PointLabel::Ignorable
        );
    }

    #[test]
    fn test_single_peak_clusters_alone() {
        let mut analyzer = single_peak_analyzer();
        let clusters = analyzer.cluster();

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 1);
        let member = clusters[0].members()[0];
        assert_eq!((member.x, member.y), (2, 2));
        assert_eq!(member.value, 100.0);
    }

    #[test]
    fn test_cluster_is_repeatable() {
        let mut analyzer = single_peak_analyzer();
        let first = analyzer.cluster();
        let second = analyzer.cluster();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(membership(a), membership(b));
        }
    }

    #[test]
    fn test_no_duplicate_members() {
        let mut analyzer = two_blob_analyzer(3);
        for cluster in analyzer.cluster() {
            let unique = membership(&cluster);
            assert_eq!(unique.len(), cluster.len());
        }
    }

    #[test]
    fn test_reach_is_a_strict_bound() {
        // Two adjacent hot cells: reach 1.0 excludes even orthogonal
        // neighbors (distance 1 is not < 1), reach 1.5 joins them.
        let xs = vec![0, 1, 2, 3, 0, 1, 2, 3];
        let ys = vec![0, 0, 0, 0, 1, 1, 1, 1];
        let values = vec![50.0, 50.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0];

        let mut narrow = GridAnalyzer::new(config(1.0, 0.5, 0.0, 1.0));
        assert!(narrow.load(&xs, &ys, &values, 4, 2));
        let clusters = narrow.cluster();
        assert_eq!(clusters.len(), 2);

        let mut wide = GridAnalyzer::new(config(1.0, 0.5, 0.0, 1.5));
        assert!(wide.load(&xs, &ys, &values, 4, 2));
        let clusters = wide.cluster();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 2);
    }

    #[test]
    fn test_padding_picks_up_weak_neighbors() {
        // (0,0) and (1,0) are strong, (1,1) sits between the thresholds and
        // is within reach, (0,1) is ignorable.
        let xs = vec![0, 1, 0, 1];
        let ys = vec![0, 0, 1, 1];
        let values = vec![10.0, 10.0, 2.0, 6.0];

        let mut analyzer = GridAnalyzer::new(config(0.5, 0.5, 0.0, 1.5));
        assert!(analyzer.load(&xs, &ys, &values, 2, 2));

        let clusters = analyzer.cluster();
        assert_eq!(clusters.len(), 1);
        assert_eq!(
            membership(&clusters[0]),
            [(0, 0), (1, 0), (1, 1)].into_iter().collect()
        );
        // Strong members come first, padding after.
        assert_eq!(clusters[0].members()[2], crate::processors::cluster::ClusterMember {
            x: 1,
            y: 1,
            value: 6.0
        });
    }

    #[test]
    fn test_weak_assist_lifts_borderline_cell() {
        let xs = vec![0, 1, 0, 1];
        let ys = vec![0, 0, 1, 1];
        let values = vec![10.0, 10.0, 2.0, 6.0];

        let mut analyzer = GridAnalyzer::new(config(0.5, 0.5, 10.0, 1.5));
        assert!(analyzer.load(&xs, &ys, &values, 2, 2));
        let thresholds = analyzer.thresholds().unwrap();

        // (0,1) alone is below the weak threshold, but two adjacent strong
        // cells contribute 1 + 1/sqrt(2) worth of assist.
        assert!(2.0 <= thresholds.weak);
        assert!(analyzer.is_weak(0, 1, thresholds));
        assert!(analyzer.is_weak(0, 1, thresholds));
        assert!(!analyzer.is_ignorable(0, 1, thresholds));
    }

    /// Two hot blobs joined by a bridge cell that is strong under the
    /// parent's diluted statistics but ignorable once the cluster is
    /// re-analyzed on its own members.
    fn two_blob_analyzer(depth: u32) -> GridAnalyzer {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        let mut values = Vec::new();

        // Background: ten cells of low-grade noise.
        for x in 0..9 {
            xs.push(x);
            ys.push(0);
            values.push(1.0);
        }
        xs.push(0);
        ys.push(2);
        values.push(1.0);

        // Two blobs on the middle row with a fainter bridge at x=4.
        for (x, value) in [(0, 50.0), (1, 50.0), (2, 50.0), (4, 30.0), (6, 50.0), (7, 50.0)] {
            xs.push(x);
            ys.push(1);
            values.push(value);
        }

        let mut cfg = config(0.5, 1.0, 0.0, 2.5);
        cfg.sub_cluster_depth = depth;
        let mut analyzer = GridAnalyzer::new(cfg);
        assert!(analyzer.load(&xs, &ys, &values, 9, 3));
        analyzer
    }

    #[test]
    fn test_sub_clustering_splits_bridged_blobs() {
        let mut analyzer = two_blob_analyzer(3);
        let clusters = analyzer.cluster();

        assert_eq!(clusters.len(), 2);
        assert_eq!(
            membership(&clusters[0]),
            [(0, 1), (1, 1), (2, 1)].into_iter().collect()
        );
        assert_eq!(
            membership(&clusters[1]),
            [(6, 1), (7, 1)].into_iter().collect()
        );
    }

    #[test]
    fn test_zero_depth_budget_disables_subdivision() {
        let mut analyzer = two_blob_analyzer(0);
        let clusters = analyzer.cluster();

        // The parent-level cluster (both blobs plus the bridge) survives.
        assert_eq!(clusters.len(), 1);
        assert_eq!(
            membership(&clusters[0]),
            [(0, 1), (1, 1), (2, 1), (4, 1), (6, 1), (7, 1)]
                .into_iter()
                .collect()
        );
    }

    #[test]
    fn test_population_guard_blocks_recursion() {
        let mut analyzer = two_blob_analyzer(3);
        analyzer.cluster();

        let classified = analyzer.cache.classified();
        assert!(classified >= MIN_SUB_CLUSTER_MEMBERS);

        // A synthetic cluster spanning the whole classified population must
        // come back unchanged, regardless of the available depth budget.
        let mut synthetic = Cluster::new();
        for i in 0..classified {
            synthetic.add_member(i % 9, i / 9, 5.0);
        }

        let result = analyzer.sub_cluster(synthetic.clone());
        assert_eq!(result, vec![synthetic]);
    }
}
