use crate::models::UrlStats;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Url,
    Mentions,
    InfluencerMentions,
    Quotes,
    Retweets,
    MentionedBy,
    Tweets,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Url,
        Column::Mentions,
        Column::InfluencerMentions,
        Column::Quotes,
        Column::Retweets,
        Column::MentionedBy,
        Column::Tweets,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Url => "URL",
            Column::Mentions => "Mentions",
            Column::InfluencerMentions => "Mentions by influencers",
            Column::Quotes => "Quotes",
            Column::Retweets => "Retweets",
            Column::MentionedBy => "Mentioned by",
            Column::Tweets => "Tweets",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Column::Url => "url",
            Column::Mentions => "mentions",
            Column::InfluencerMentions => "influencer_mentions",
            Column::Quotes => "quotes",
            Column::Retweets => "retweets",
            Column::MentionedBy => "mentioned_by",
            Column::Tweets => "tweets",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.key() == key)
    }

    fn compare(self, a: &UrlStats, b: &UrlStats) -> Ordering {
        match self {
            Column::Url => a.link_text().cmp(b.link_text()),
            Column::Mentions => a.mentions_count.cmp(&b.mentions_count),
            Column::InfluencerMentions => a.influencer_mentions_count.cmp(&b.influencer_mentions_count),
            Column::Quotes => a.quote_count.cmp(&b.quote_count),
            Column::Retweets => a.retweet_count.cmp(&b.retweet_count),
            Column::MentionedBy => a.mentioned_by_influencers.len().cmp(&b.mentioned_by_influencers.len()),
            Column::Tweets => Ordering::Equal,
        }
        .then(a.index.cmp(&b.index))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }

    pub fn indicator(self) -> &'static str {
        match self {
            Direction::Ascending => " 🔼",
            Direction::Descending => " 🔽",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: Column,
    pub direction: Direction,
}

impl SortSpec {
    /// Unknown columns mean unsorted; unknown orders mean ascending.
    pub fn from_query(sort: Option<&str>, order: Option<&str>) -> Option<Self> {
        let column = Column::from_key(sort?)?;
        let direction = match order {
            Some("desc") => Direction::Descending,
            _ => Direction::Ascending,
        };
        Some(Self { column, direction })
    }

    pub fn direction_for(current: Option<SortSpec>, column: Column) -> Option<Direction> {
        current
            .filter(|spec| spec.column == column)
            .map(|spec| spec.direction)
    }

    /// Header click cycle: unsorted, ascending, descending, unsorted.
    pub fn toggled(current: Option<SortSpec>, column: Column) -> Option<SortSpec> {
        match Self::direction_for(current, column) {
            None => Some(SortSpec {
                column,
                direction: Direction::Ascending,
            }),
            Some(Direction::Ascending) => Some(SortSpec {
                column,
                direction: Direction::Descending,
            }),
            Some(Direction::Descending) => None,
        }
    }
}

/// Rows in display order. The fetched slice is left untouched; ties fall
/// back to positional index so descending is the exact reverse of ascending.
pub fn sorted_rows(records: &[UrlStats], sort: Option<SortSpec>) -> Vec<&UrlStats> {
    let mut rows: Vec<&UrlStats> = records.iter().collect();
    if let Some(spec) = sort {
        rows.sort_by(|a, b| spec.column.compare(a, b));
        if spec.direction == Direction::Descending {
            rows.reverse();
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assign_indices;

    fn rows(mentions: &[u64]) -> Vec<UrlStats> {
        let mut records: Vec<UrlStats> = mentions
            .iter()
            .map(|&count| UrlStats {
                mentioned_url: format!("https://example.com/{count}"),
                mentions_count: count,
                ..UrlStats::default()
            })
            .collect();
        assign_indices(&mut records);
        records
    }

    fn order(rows: &[&UrlStats]) -> Vec<usize> {
        rows.iter().map(|row| row.index).collect()
    }

    #[test]
    fn mentions_desc_reverses_asc_with_stable_ties() {
        let records = rows(&[5, 2, 5, 9, 2]);
        let spec = |direction| Some(SortSpec { column: Column::Mentions, direction });

        let asc = order(&sorted_rows(&records, spec(Direction::Ascending)));
        let desc = order(&sorted_rows(&records, spec(Direction::Descending)));

        assert_eq!(asc, vec![1, 4, 0, 2, 3]);
        let mut reversed = desc.clone();
        reversed.reverse();
        assert_eq!(asc, reversed);
    }

    #[test]
    fn sorting_leaves_source_untouched() {
        let records = rows(&[3, 1, 2]);
        let before = records.clone();
        let sorted = sorted_rows(
            &records,
            Some(SortSpec { column: Column::Mentions, direction: Direction::Ascending }),
        );
        assert_eq!(order(&sorted), vec![1, 2, 0]);
        assert_eq!(records, before);
        assert_eq!(order(&sorted_rows(&records, None)), vec![0, 1, 2]);
    }

    #[test]
    fn header_toggle_cycles_through_states() {
        let first = SortSpec::toggled(None, Column::Quotes);
        assert_eq!(first, Some(SortSpec { column: Column::Quotes, direction: Direction::Ascending }));
        let second = SortSpec::toggled(first, Column::Quotes);
        assert_eq!(second.map(|s| s.direction), Some(Direction::Descending));
        assert_eq!(SortSpec::toggled(second, Column::Quotes), None);

        let other = SortSpec::toggled(second, Column::Retweets);
        assert_eq!(other, Some(SortSpec { column: Column::Retweets, direction: Direction::Ascending }));
    }

    #[test]
    fn query_parsing_is_forgiving() {
        assert_eq!(SortSpec::from_query(None, Some("desc")), None);
        assert_eq!(SortSpec::from_query(Some("bogus"), None), None);
        assert_eq!(
            SortSpec::from_query(Some("mentions"), Some("sideways")),
            Some(SortSpec { column: Column::Mentions, direction: Direction::Ascending })
        );
        assert_eq!(
            SortSpec::from_query(Some("mentioned_by"), Some("desc")),
            Some(SortSpec { column: Column::MentionedBy, direction: Direction::Descending })
        );
    }

    #[test]
    fn url_column_sorts_by_link_text() {
        let mut records = rows(&[1, 1]);
        records[0].title = "Zebra".into();
        records[1].title = "Aardvark".into();
        let sorted = sorted_rows(&records, Some(SortSpec { column: Column::Url, direction: Direction::Ascending }));
        assert_eq!(order(&sorted), vec![1, 0]);
    }
}
