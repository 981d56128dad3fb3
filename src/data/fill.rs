use super::model::Observation;

/// What forward filling changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    /// Missing values replaced by an earlier value of the same country.
    pub filled: usize,
    /// (country, year) gaps with no earlier value to carry forward.
    pub unfilled: Vec<(String, i32)>,
}

/// Forward-fill missing values per country.
///
/// Sorts `observations` by (country, year) first. A filled value inherits
/// the unit flag of the value it was copied from. Leading gaps stay `None`.
pub fn forward_fill(observations: &mut [Observation<'_>]) -> FillReport {
    observations.sort_by(|a, b| a.country.cmp(b.country).then(a.year.cmp(&b.year)));

    let mut report = FillReport::default();
    let mut last: Option<(&str, f64, bool)> = None;

    for obs in observations.iter_mut() {
        if last.is_some_and(|(country, _, _)| country != obs.country) {
            last = None;
        }
        match (obs.value, last) {
            (Some(v), _) => last = Some((obs.country, v, obs.explicit_unit)),
            (None, Some((_, v, explicit))) => {
                obs.value = Some(v);
                obs.explicit_unit = explicit;
                report.filled += 1;
            }
            (None, None) => report.unfilled.push((obs.country.to_string(), obs.year)),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(country: &str, year: i32, value: Option<f64>) -> Observation<'_> {
        Observation {
            country,
            year,
            value,
            explicit_unit: false,
        }
    }

    fn values(observations: &[Observation<'_>]) -> Vec<Option<f64>> {
        observations.iter().map(|o| o.value).collect()
    }

    #[test]
    fn carries_last_value_forward() {
        let mut series = vec![
            obs("X", 2000, Some(10.0)),
            obs("X", 2001, None),
            obs("X", 2002, None),
            obs("X", 2003, Some(40.0)),
        ];
        let report = forward_fill(&mut series);
        assert_eq!(
            values(&series),
            vec![Some(10.0), Some(10.0), Some(10.0), Some(40.0)]
        );
        assert_eq!(report.filled, 2);
        assert!(report.unfilled.is_empty());
    }

    #[test]
    fn leading_gap_stays_unfilled() {
        let mut series = vec![obs("X", 2000, None), obs("X", 2001, Some(5.0))];
        let report = forward_fill(&mut series);
        assert_eq!(values(&series), vec![None, Some(5.0)]);
        assert_eq!(report.unfilled, vec![("X".to_string(), 2000)]);
    }

    #[test]
    fn never_crosses_countries() {
        let mut series = vec![
            obs("A", 2000, Some(1.0)),
            obs("A", 2001, Some(2.0)),
            obs("B", 2000, None),
            obs("B", 2001, Some(3.0)),
        ];
        let report = forward_fill(&mut series);
        assert_eq!(values(&series), vec![Some(1.0), Some(2.0), None, Some(3.0)]);
        assert_eq!(report.unfilled, vec![("B".to_string(), 2000)]);
    }

    #[test]
    fn orders_by_year_before_filling() {
        // melted order interleaves countries and years out of order
        let mut series = vec![
            obs("B", 2001, None),
            obs("A", 2002, None),
            obs("A", 2000, Some(7.0)),
            obs("B", 2000, Some(9.0)),
            obs("A", 2001, None),
        ];
        forward_fill(&mut series);
        let filled: Vec<(&str, i32, Option<f64>)> =
            series.iter().map(|o| (o.country, o.year, o.value)).collect();
        assert_eq!(
            filled,
            vec![
                ("A", 2000, Some(7.0)),
                ("A", 2001, Some(7.0)),
                ("A", 2002, Some(7.0)),
                ("B", 2000, Some(9.0)),
                ("B", 2001, Some(9.0)),
            ]
        );
    }

    #[test]
    fn filled_value_keeps_unit_flag() {
        let mut series = vec![
            Observation {
                country: "A",
                year: 2000,
                value: Some(2e6),
                explicit_unit: true,
            },
            obs("A", 2001, None),
        ];
        forward_fill(&mut series);
        assert!(series[1].explicit_unit);
    }

    #[test]
    fn zero_is_not_missing() {
        let mut series = vec![obs("A", 2000, Some(3.0)), obs("A", 2001, Some(0.0))];
        let report = forward_fill(&mut series);
        assert_eq!(values(&series), vec![Some(3.0), Some(0.0)]);
        assert_eq!(report.filled, 0);
    }
}
