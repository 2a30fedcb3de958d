use std::{
    fmt::{Debug, Display},
    time::{Duration, Instant},
};

use histogram::Histogram;

use crate::{
    constants::Level,
    graph::{node_index, Graph},
};

#[derive(Debug, Default, Clone)]
pub struct SearchStats {
    pub nodes_settled: usize,
    pub duration: Option<Duration>,
    start_time: Option<Instant>,
}

impl SearchStats {
    pub fn init(&mut self) {
        self.nodes_settled = 0;
        self.start_timer();
    }

    fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn finish(&mut self) {
        if let Some(start_time) = self.start_time {
            self.duration = Some(start_time.elapsed());
        }
    }
}

impl Display for SearchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Stats: {} nodes settled in {:?}",
            self.nodes_settled, self.duration
        )
    }
}

pub fn degree_out_hist(g: &Graph) -> Histogram {
    let hist = Histogram::new(0, 10, 30).unwrap();
    for node in 0..g.num_nodes() {
        let degree = g.degree(node_index(node));
        hist.increment(degree as u64, 1).unwrap();
    }
    hist
}

pub fn average_out_degree(g: &Graph) -> f64 {
    if g.num_nodes() == 0 {
        return 0.0;
    }
    let sum: usize = (0..g.num_nodes()).map(|node| g.degree(node_index(node))).sum();
    sum as f64 / g.num_nodes() as f64
}

/// Number of nodes per level, index 0 counts uncontracted nodes
pub fn level_count(g: &Graph) -> Vec<usize> {
    let mut count = vec![0; g.num_levels() as usize + 1];
    for node in 0..g.num_nodes() {
        let level: Level = g.level(node_index(node));
        count[level as usize] += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::{
        graph::Graph,
        search::dijkstra::Dijkstra,
        statistics::{average_out_degree, degree_out_hist, level_count},
        util::test_graphs::{generate_complex_graph, line_grid},
    };

    #[test]
    fn stats_work() {
        let g = Graph::from_grid(&line_grid()).unwrap();

        let mut d = Dijkstra::new(&g);
        d.find_route(0.into(), 3.into());

        assert!(d.stats.duration.is_some());
        // 0, 1 and 2 are relaxed, 3 is only looked at
        assert_eq!(d.stats.nodes_settled, 3);
    }

    #[test]
    fn degree_hist_out_works() {
        let g = generate_complex_graph();

        let hist = degree_out_hist(&g);
        let mut total = 0;
        for bucket in hist.into_iter().filter(|b| b.count() > 0) {
            println!("[{}-{}]: {}", bucket.low(), bucket.high(), bucket.count());
            total += bucket.count();
        }
        assert_eq!(total, 11);
        assert_relative_eq!(average_out_degree(&g), 40.0 / 11.0);
    }

    #[test]
    fn levels_are_counted() {
        let mut g = generate_complex_graph();
        assert_eq!(level_count(&g), vec![11]);

        g.contract();
        let count = level_count(&g);
        assert_eq!(count[0], 0);
        assert_eq!(count.iter().sum::<usize>(), 11);
        assert_eq!(count.len(), g.num_levels() as usize + 1);
    }
}
