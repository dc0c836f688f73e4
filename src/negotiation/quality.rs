//! Quality-list parsing shared by the Accept, Accept-Charset and
//! Accept-Language negotiators.

/// One entry of a quality list such as `text/html;q=0.8`.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityItem {
    /// Lower-cased value with parameters stripped
    pub value: String,
    /// Quality factor in `0.0..=1.0`
    pub quality: f32,
}

/// Parsed quality list, kept in header order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualityList {
    pub items: Vec<QualityItem>,
}

fn parse_quality(raw: &str) -> f32 {
    match raw.parse::<f32>() {
        Ok(q) if q.is_finite() => q.clamp(0.0, 1.0),
        Ok(_) => 0.0,
        Err(_) => 1.0,
    }
}

impl QualityList {
    /// Parse a comma separated header value.
    ///
    /// Unparseable `q` parameters count as `1.0`, non-finite ones (`NaN`,
    /// `inf`) as `0.0`; out-of-range ones are clamped.
    pub fn parse(header: &str) -> Self {
        let items = header
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.split(';');
                let value = pieces.next()?.trim().to_ascii_lowercase();
                if value.is_empty() {
                    return None;
                }
                let quality = pieces
                    .filter_map(|p| {
                        let (k, v) = p.split_once('=')?;
                        k.trim().eq_ignore_ascii_case("q").then(|| v.trim())
                    })
                    .next()
                    .map(parse_quality)
                    .unwrap_or(1.0);
                Some(QualityItem { value, quality })
            })
            .collect();
        Self { items }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Quality of the most specific matching entry, `0.0` when nothing matches.
    ///
    /// `specificity` returns `None` for a non-matching entry and a rank for a
    /// matching one; higher ranks win.
    pub fn quality_of<F>(&self, specificity: F) -> f32
    where
        F: Fn(&str) -> Option<usize>,
    {
        self.items
            .iter()
            .filter_map(|item| specificity(&item.value).map(|rank| (rank, item.quality)))
            .fold(None::<(usize, f32)>, |best, cur| match best {
                Some(b) if b.0 >= cur.0 => Some(b),
                _ => Some(cur),
            })
            .map(|(_, q)| q)
            .unwrap_or(0.0)
    }
}

/// Pick the candidate with the highest positive quality.
///
/// Ties go to the earlier candidate, so the server's declared order breaks them.
pub fn best_candidate<F>(candidates: &[String], quality: F) -> Option<String>
where
    F: Fn(&str) -> f32,
{
    let mut best: Option<(&String, f32)> = None;
    for candidate in candidates {
        let q = quality(candidate);
        if q.is_nan() || q <= 0.0 {
            continue;
        }
        match best {
            Some((_, bq)) if bq >= q => {}
            _ => best = Some((candidate, q)),
        }
    }
    best.map(|(c, _)| c.clone())
}
