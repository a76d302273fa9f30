//! Insight generator: renders the correlation report into a small set
//! of ranked, human-readable findings. Pure; no side effects.

use crate::cache::CacheStatistics;
use crate::correlation::CorrelationReport;

pub fn generate(report: &CorrelationReport, cache: &CacheStatistics) -> Vec<String> {
    let mut insights = Vec::new();

    if report.total_tokens > 0 {
        let validation_rate =
            report.multi_platform_tokens.len() as f64 / report.total_tokens as f64 * 100.0;
        insights.push(format!(
            "Cross-platform validation: {}/{} tokens ({:.1}%) reported by more than one provider",
            report.multi_platform_tokens.len(),
            report.total_tokens,
            validation_rate
        ));

        if let Some(top) = report.all_tokens.first() {
            let display = top.symbol.as_deref().unwrap_or(top.address.as_str());
            insights.push(format!(
                "Top conviction: {} scored {:.1} across {} platform(s)",
                display,
                top.score,
                top.platforms.len()
            ));
        }

        let golden_count = report
            .all_tokens
            .iter()
            .filter(|t| t.boost_tier.is_golden())
            .count();
        if golden_count > 0 {
            insights.push(format!(
                "{} token(s) carry a golden-ticker boost",
                golden_count
            ));
        }

        if let Some((platform, analysis)) = report
            .platform_analysis
            .iter()
            .max_by(|(_, a), (_, b)| {
                a.high_conviction_rate
                    .partial_cmp(&b.high_conviction_rate)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| {
                        a.avg_score
                            .partial_cmp(&b.avg_score)
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
            })
        {
            insights.push(format!(
                "Most effective provider: {} ({:.0}% high conviction over {} tokens, avg score {:.1})",
                platform,
                analysis.high_conviction_rate * 100.0,
                analysis.token_count,
                analysis.avg_score
            ));
        }
    }

    if cache.hits + cache.misses > 0 {
        insights.push(format!(
            "Cache: {:.1}% hit rate ({} hits), ~${:.2} in provider calls avoided",
            cache.hit_rate_percent, cache.hits, cache.estimated_cost_savings
        ));
    }

    insights
}
