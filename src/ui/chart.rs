use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget},
};

use crate::model::record::StreamRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub label: String,
    pub price: f64,
    pub change_1m: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentPoint {
    pub label: String,
    /// 5-minute sentiment average; 0.0 (neutral) when the record had none.
    pub sentiment: f64,
    /// Up-probability rescaled to [-1, 1]; `None` is a gap, not a zero.
    pub prediction: Option<f64>,
}

/// Map a probability in [0, 1] onto the sentiment axis [-1, 1].
pub fn scale_probability(p: f64) -> f64 {
    p * 2.0 - 1.0
}

/// Records that carry a price, in arrival order. Sentiment-only records are skipped.
pub fn price_series<'a, I>(records: I) -> Vec<PricePoint>
where
    I: IntoIterator<Item = &'a StreamRecord>,
{
    records
        .into_iter()
        .filter_map(|r| {
            r.price.map(|price| PricePoint {
                label: r.display_time(),
                price,
                change_1m: r.change_1m,
            })
        })
        .collect()
}

/// One point per record, sentiment defaulted to neutral and probability rescaled.
pub fn sentiment_series<'a, I>(records: I) -> Vec<SentimentPoint>
where
    I: IntoIterator<Item = &'a StreamRecord>,
{
    records
        .into_iter()
        .map(|r| SentimentPoint {
            label: r.display_time(),
            sentiment: r.sentiment_avg_5m.unwrap_or(0.0),
            prediction: r.pred_up_prob.map(scale_probability),
        })
        .collect()
}

/// Coordinates for the prediction line. Gaps are left out so the line joins the points on
/// either side of them.
pub fn prediction_coords(points: &[SentimentPoint]) -> Vec<(f64, f64)> {
    points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.prediction.map(|v| (i as f64, v)))
        .collect()
}

fn x_bounds(len: usize) -> [f64; 2] {
    [0.0, (len.saturating_sub(1) as f64).max(1.0)]
}

fn x_labels<'a>(first: Option<&'a str>, last: Option<&'a str>) -> Vec<Span<'a>> {
    let style = Style::default().fg(Color::DarkGray);
    match (first, last) {
        (Some(a), Some(b)) if a != b => vec![Span::styled(a, style), Span::styled(b, style)],
        (Some(a), _) => vec![Span::styled(a, style)],
        _ => Vec::new(),
    }
}

fn chart_block(title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

fn render_waiting(block: Block<'_>, area: Rect, buf: &mut Buffer) {
    Paragraph::new(Line::from(Span::styled(
        "waiting for data...",
        Style::default().fg(Color::DarkGray),
    )))
    .block(block)
    .render(area, buf);
}

pub struct PriceChart<'a> {
    points: &'a [PricePoint],
    symbol: &'a str,
}

impl<'a> PriceChart<'a> {
    pub fn new(points: &'a [PricePoint], symbol: &'a str) -> Self {
        Self { points, symbol }
    }
}

impl Widget for PriceChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let latest = self.points.last();
        let title = match latest {
            Some(p) => match p.change_1m {
                Some(ch) => format!(" Price ({}) {:.2}  1m {:+.2} ", self.symbol, p.price, ch),
                None => format!(" Price ({}) {:.2} ", self.symbol, p.price),
            },
            None => format!(" Price ({}) ", self.symbol),
        };
        let block = chart_block(title);

        if self.points.is_empty() {
            render_waiting(block, area, buf);
            return;
        }

        let coords: Vec<(f64, f64)> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.price))
            .collect();

        let min_price = self.points.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
        let max_price = self
            .points
            .iter()
            .map(|p| p.price)
            .fold(f64::NEG_INFINITY, f64::max);
        let range = max_price - min_price;
        let pad = if range < 0.01 {
            (max_price.abs() * 0.001).max(0.5)
        } else {
            range * 0.05
        };
        let (lo, hi) = (min_price - pad, max_price + pad);

        let datasets = vec![Dataset::default()
            .name("price")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Rgb(255, 115, 0)))
            .data(&coords)];

        let label_style = Style::default().fg(Color::DarkGray);
        Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .bounds(x_bounds(coords.len()))
                    .labels(x_labels(
                        self.points.first().map(|p| p.label.as_str()),
                        latest.map(|p| p.label.as_str()),
                    )),
            )
            .y_axis(
                Axis::default()
                    .bounds([lo, hi])
                    .labels(vec![
                        Span::styled(format!("{:.2}", lo), label_style),
                        Span::styled(format!("{:.2}", hi), label_style),
                    ]),
            )
            .render(area, buf);
    }
}

pub struct SentimentChart<'a> {
    points: &'a [SentimentPoint],
}

impl<'a> SentimentChart<'a> {
    pub fn new(points: &'a [SentimentPoint]) -> Self {
        Self { points }
    }
}

impl Widget for SentimentChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = chart_block(" Sentiment (5m avg) & Predicted Up Probability ".to_string());

        if self.points.is_empty() {
            render_waiting(block, area, buf);
            return;
        }

        let sentiment: Vec<(f64, f64)> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.sentiment))
            .collect();
        let prediction = prediction_coords(self.points);
        let [x0, x1] = x_bounds(self.points.len());
        let zero = [(x0, 0.0), (x1, 0.0)];

        let datasets = vec![
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::DarkGray))
                .data(&zero),
            Dataset::default()
                .name("sentiment 5m")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Rgb(136, 132, 216)))
                .data(&sentiment),
            Dataset::default()
                .name("p(up) scaled")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(
                    Style::default()
                        .fg(Color::Rgb(130, 202, 157))
                        .add_modifier(Modifier::BOLD),
                )
                .data(&prediction),
        ];

        let label_style = Style::default().fg(Color::DarkGray);
        Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .bounds([x0, x1])
                    .labels(x_labels(
                        self.points.first().map(|p| p.label.as_str()),
                        self.points.last().map(|p| p.label.as_str()),
                    )),
            )
            .y_axis(Axis::default().bounds([-1.0, 1.0]).labels(vec![
                Span::styled("-1", label_style),
                Span::styled("0", label_style),
                Span::styled("1", label_style),
            ]))
            .render(area, buf);
    }
}
