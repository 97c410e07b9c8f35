use super::Candidate;

/// Stable ascending sort by distance. Equal distances keep their input order.
pub fn sort_by_distance(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::fixtures::store;

    fn candidate(name: &str, distance_km: f64) -> Candidate {
        Candidate {
            store: store(name, 0.0, 0.0),
            distance_km,
        }
    }

    #[test]
    fn ties_preserve_filter_order() {
        let mut list = vec![
            candidate("c", 3.0),
            candidate("a1", 1.0),
            candidate("b", 2.0),
            candidate("a2", 1.0),
            candidate("a3", 1.0),
        ];
        sort_by_distance(&mut list);
        let names: Vec<&str> = list.iter().map(|c| c.store.name.as_str()).collect();
        assert_eq!(names, ["a1", "a2", "a3", "b", "c"]);
    }
}
