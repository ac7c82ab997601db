//! Lloyd's k-means over a single feature column with k-means++ seeding.

use rand::rngs::StdRng;
use rand::Rng;

const MAX_ITER: usize = 300;

#[derive(Debug, Clone)]
pub struct KMeans {
    pub centroids: Vec<f64>,
    pub labels: Vec<usize>,
    pub inertia: f64,
}

fn sq(d: f64) -> f64 {
    d * d
}

fn nearest(centroids: &[f64], x: f64) -> usize {
    let mut best = 0;
    for (c, &centroid) in centroids.iter().enumerate().skip(1) {
        if sq(x - centroid) < sq(x - centroids[best]) {
            best = c;
        }
    }
    best
}

fn plus_plus(points: &[f64], k: usize, rng: &mut StdRng) -> Vec<f64> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())]);
    let mut d2: Vec<f64> = points.iter().map(|&x| sq(x - centroids[0])).collect();

    while centroids.len() < k {
        let total: f64 = d2.iter().sum();
        let pick = if total > 0.0 {
            let mut r = rng.gen::<f64>() * total;
            let mut chosen = points.len() - 1;
            for (i, &w) in d2.iter().enumerate() {
                if r < w {
                    chosen = i;
                    break;
                }
                r -= w;
            }
            chosen
        } else {
            // Every point already coincides with a centroid.
            rng.gen_range(0..points.len())
        };
        let c = points[pick];
        centroids.push(c);
        for (d, &x) in d2.iter_mut().zip(points) {
            *d = d.min(sq(x - c));
        }
    }
    centroids
}

/// Move the point farthest from its centroid, taken from a cluster that can
/// spare one, into each empty cluster.
fn fill_empty(points: &[f64], centroids: &mut [f64], labels: &mut [usize]) {
    let k = centroids.len();
    let mut sizes = vec![0usize; k];
    for &l in labels.iter() {
        sizes[l] += 1;
    }
    for c in 0..k {
        if sizes[c] > 0 {
            continue;
        }
        let mut donor: Option<usize> = None;
        for (i, &x) in points.iter().enumerate() {
            if sizes[labels[i]] < 2 {
                continue;
            }
            let far = sq(x - centroids[labels[i]]);
            if donor.map_or(true, |d| far > sq(points[d] - centroids[labels[d]])) {
                donor = Some(i);
            }
        }
        let Some(i) = donor else { return };
        sizes[labels[i]] -= 1;
        labels[i] = c;
        sizes[c] = 1;
        centroids[c] = points[i];
    }
}

fn lloyd(points: &[f64], mut centroids: Vec<f64>) -> KMeans {
    let k = centroids.len();
    let mut labels: Vec<usize> = points.iter().map(|&x| nearest(&centroids, x)).collect();

    for _ in 0..MAX_ITER {
        fill_empty(points, &mut centroids, &mut labels);

        let mut sums = vec![0.0; k];
        let mut counts = vec![0usize; k];
        for (&x, &l) in points.iter().zip(&labels) {
            sums[l] += x;
            counts[l] += 1;
        }
        for c in 0..k {
            if counts[c] > 0 {
                centroids[c] = sums[c] / counts[c] as f64;
            }
        }

        // A point only moves for a strictly closer centroid, so ties keep
        // the current partition stable.
        let mut changed = false;
        for (i, &x) in points.iter().enumerate() {
            let current = labels[i];
            let mut best = current;
            for (c, &centroid) in centroids.iter().enumerate() {
                if sq(x - centroid) < sq(x - centroids[best]) {
                    best = c;
                }
            }
            if best != current {
                labels[i] = best;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let inertia = points
        .iter()
        .zip(&labels)
        .map(|(&x, &l)| sq(x - centroids[l]))
        .sum();
    KMeans {
        centroids,
        labels,
        inertia,
    }
}

/// Best of `n_init` seeded runs by inertia. Requires `1 <= k <= points.len()`.
pub fn fit(points: &[f64], k: usize, n_init: usize, rng: &mut StdRng) -> KMeans {
    debug_assert!(k >= 1 && k <= points.len());
    let mut best: Option<KMeans> = None;
    for _ in 0..n_init.max(1) {
        let run = lloyd(points, plus_plus(points, k, rng));
        if best.as_ref().map_or(true, |b| run.inertia < b.inertia) {
            best = Some(run);
        }
    }
    best.unwrap_or_else(|| lloyd(points, plus_plus(points, k, rng)))
}
