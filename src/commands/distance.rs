use ndarray::{ArrayD, Axis, IxDyn, Zip};

/// Exact squared Euclidean distance from every pixel to the nearest site,
/// together with the flat (row-major) index of that site. Pixels in a domain
/// without any site keep an infinite distance and `usize::MAX` as index.
pub(crate) struct DistanceField {
    pub squared: ArrayD<f64>,
    pub nearest: ArrayD<usize>,
}

/// Separable lower-envelope transform, one pass per axis.
pub(crate) fn distance_field(sites: &ArrayD<bool>) -> DistanceField {
    let shape = sites.shape().to_vec();
    let mut squared = sites.mapv(|site| if site { 0.0 } else { f64::INFINITY });
    let mut nearest = ArrayD::from_shape_vec(IxDyn(&shape), (0..sites.len()).collect())
        .unwrap_or_else(|_| ArrayD::zeros(IxDyn(&shape)));
    Zip::from(&mut nearest).and(sites).for_each(|index, site| {
        if !*site {
            *index = usize::MAX;
        }
    });

    for axis in 0..shape.len() {
        Zip::from(squared.lanes_mut(Axis(axis)))
            .and(nearest.lanes_mut(Axis(axis)))
            .par_for_each(|mut distance_lane, mut nearest_lane| {
                let distances = distance_lane.to_vec();
                let features = nearest_lane.to_vec();
                let (distances, features) = envelope_pass(&distances, &features);
                distance_lane
                    .iter_mut()
                    .zip(distances)
                    .for_each(|(slot, value)| *slot = value);
                nearest_lane
                    .iter_mut()
                    .zip(features)
                    .for_each(|(slot, value)| *slot = value);
            });
    }
    DistanceField { squared, nearest }
}

fn envelope_pass(values: &[f64], features: &[usize]) -> (Vec<f64>, Vec<usize>) {
    let len = values.len();
    let mut hull: Vec<usize> = Vec::with_capacity(len);
    let mut starts: Vec<f64> = Vec::with_capacity(len);
    for q in (0..len).filter(|q| values[*q].is_finite()) {
        let mut start = f64::NEG_INFINITY;
        while let Some(&p) = hull.last() {
            let candidate = intersection(values, p, q);
            if candidate <= starts[starts.len() - 1] {
                hull.pop();
                starts.pop();
            } else {
                start = candidate;
                break;
            }
        }
        hull.push(q);
        starts.push(start);
    }
    if hull.is_empty() {
        return (values.to_vec(), features.to_vec());
    }

    let mut distances = Vec::with_capacity(len);
    let mut nearest = Vec::with_capacity(len);
    let mut k = 0;
    for p in 0..len {
        while k + 1 < hull.len() && starts[k + 1] < p as f64 {
            k += 1;
        }
        let vertex = hull[k];
        let offset = p as f64 - vertex as f64;
        distances.push(offset * offset + values[vertex]);
        nearest.push(features[vertex]);
    }
    (distances, nearest)
}

fn intersection(values: &[f64], p: usize, q: usize) -> f64 {
    let (p_f, q_f) = (p as f64, q as f64);
    ((values[q] + q_f * q_f) - (values[p] + p_f * p_f)) / (2.0 * (q_f - p_f))
}

/// Distance from every `true` pixel to the nearest `false` pixel; zero on
/// `false` pixels. With no `false` pixel at all every distance is capped just
/// above the array diagonal.
pub(crate) fn euclidean_distance(mask: &ArrayD<bool>) -> ArrayD<f64> {
    let background = mask.mapv(|inside| !inside);
    let field = distance_field(&background);
    let cap = mask.shape().iter().map(|len| (len * len) as f64).sum::<f64>().sqrt() + 1.0;
    field
        .squared
        .mapv(|value| if value.is_finite() { value.sqrt() } else { cap })
}

/// Signed distance: positive outside the mask, negative inside.
pub(crate) fn signed_distance(mask: &ArrayD<bool>) -> ArrayD<f64> {
    let outside = euclidean_distance(&mask.mapv(|inside| !inside));
    let inside = euclidean_distance(mask);
    outside - inside
}
