//! The final report: erroneous sites worst first, then program outputs and what fed them.

use crate::config::ShadowConfig;
use crate::evaluate::ErrorAggregate;
use crate::marks::MarkTable;
use crate::site::{SiteId, SiteTable};
use crate::tea::RenderedTea;
use fpshadow_ops::{FloatWidth, OpSite, ShadowOp};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::io::Write;

const UNKNOWN: &str = "Unknown";

#[derive(Clone, Debug)]
pub struct SiteReport {
    pub id: SiteId,
    pub op: ShadowOp,
    pub site: OpSite,
    pub width: FloatWidth,
    pub error: ErrorAggregate,
    pub expr: Option<RenderedTea>,
}

#[derive(Clone, Debug)]
pub struct MarkReport {
    pub site: OpSite,
    pub error: ErrorAggregate,
    pub influences: Vec<SiteReport>,
}

#[derive(Clone, Debug)]
pub struct Report {
    pub sites: Vec<SiteReport>,
    pub marks: Vec<MarkReport>,
    human_readable: bool,
    typed_bench: bool,
}

/// Orders `candidates` by descending max error and drops every site that appears inside the
/// expression of a worse site. A site is never dropped by its own expression, and a site that
/// was already dropped does not drop anything.
pub fn rank_and_subsume(
    candidates: &[SiteId],
    sites: &SiteTable,
    config: &ShadowConfig,
) -> Vec<SiteId> {
    let mut ranked: Vec<Option<SiteId>> = candidates.iter().copied().map(Some).collect();
    ranked.sort_by(|a, b| {
        let max = |id: &Option<SiteId>| id.map_or(0.0, |id| sites.get(id).error.max_error);
        max(b).total_cmp(&max(a))
    });
    if config.report_exprs {
        let position: HashMap<SiteId, usize> = ranked
            .iter()
            .enumerate()
            .filter_map(|(idx, id)| id.map(|id| (id, idx)))
            .collect();
        for idx in 0..ranked.len() {
            let Some(walker) = ranked[idx] else {
                continue;
            };
            let Some(tea) = sites.get(walker).tea.tea() else {
                continue;
            };
            for sub in tea.descendant_sites(config.max_subsume_depth) {
                if sub == walker {
                    continue;
                }
                if let Some(pos) = position.get(&sub) {
                    ranked[*pos] = None;
                }
            }
        }
    }
    ranked.into_iter().flatten().collect()
}

fn site_report(id: SiteId, sites: &SiteTable, config: &ShadowConfig) -> Option<SiteReport> {
    let record = sites.get(id);
    let tea = if config.report_exprs {
        record.tea.tea()
    } else {
        None
    };
    if tea.is_some_and(|t| t.is_bare_negation()) {
        return None;
    }
    Some(SiteReport {
        id,
        op: record.op,
        site: record.site.clone(),
        width: record.width,
        error: record.error,
        expr: tea.map(|t| t.render_as(record.width, config.max_print_depth)),
    })
}

impl Report {
    pub fn build(sites: &SiteTable, marks: &MarkTable, config: &ShadowConfig) -> Report {
        let site_reports = rank_and_subsume(sites.tracked(), sites, config)
            .into_iter()
            .filter_map(|id| site_report(id, sites, config))
            .collect();
        let mark_reports = marks
            .iter()
            .map(|mark| MarkReport {
                site: mark.site.clone(),
                error: mark.error,
                influences: rank_and_subsume(mark.influences(), sites, config)
                    .into_iter()
                    .filter_map(|id| site_report(id, sites, config))
                    .collect(),
            })
            .collect();
        Report {
            sites: site_reports,
            marks: mark_reports,
            human_readable: config.human_readable,
            typed_bench: config.typed_bench,
        }
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        write!(out, "{}", self)
    }

    fn bench(&self, site: &SiteReport) -> Option<String> {
        let precision = self.typed_bench.then_some(site.width);
        site.expr.as_ref().map(|e| e.fpcore(precision))
    }

    fn fmt_site_human(
        &self,
        f: &mut Formatter<'_>,
        site: &SiteReport,
        indent: &str,
    ) -> std::fmt::Result {
        if let Some(bench) = self.bench(site) {
            writeln!(f, "{}{}", indent, bench)?;
        }
        writeln!(
            f,
            "{}{} in {} at {}:{} (address {:X})",
            indent,
            site.op.plain_name(),
            site.site.function().unwrap_or(UNKNOWN),
            site.site.file().unwrap_or(UNKNOWN),
            site.site.line().unwrap_or(0),
            site.site.address
        )?;
        writeln!(f, "{}{:.6} bits average error", indent, site.error.average())?;
        writeln!(f, "{}{:.6} bits max error", indent, site.error.max_error)?;
        writeln!(f, "{}Aggregated over {} instances", indent, site.error.num_evals)?;
        writeln!(f)
    }

    fn fmt_site_sexp(&self, f: &mut Formatter<'_>, site: &SiteReport) -> std::fmt::Result {
        write!(f, "(")?;
        if let Some(bench) = self.bench(site) {
            write!(f, "(bench {}) ", bench)?;
        }
        write!(
            f,
            "(plain-name \"{}\") (function \"{}\") (filename \"{}\") (line-num {}) (instr-addr {:X}) (avg-error {:.6}) (max-error {:.6}) (num-calls {}))",
            site.op.plain_name(),
            site.site.function().unwrap_or(UNKNOWN),
            site.site.file().unwrap_or(UNKNOWN),
            site.site.line().unwrap_or(0),
            site.site.address,
            site.error.average(),
            site.error.max_error,
            site.error.num_evals
        )
    }

    fn fmt_mark_header(&self, f: &mut Formatter<'_>, mark: &MarkReport) -> std::fmt::Result {
        let function = mark.site.function().unwrap_or(UNKNOWN);
        let file = mark.site.file().unwrap_or(UNKNOWN);
        let line = mark.site.line().unwrap_or(0);
        if self.human_readable {
            writeln!(
                f,
                "Result in {} at {}:{} (address {:X})",
                function, file, line, mark.site.address
            )?;
            writeln!(f, "{:.6} bits average error", mark.error.average())?;
            writeln!(f, "{:.6} bits max error", mark.error.max_error)?;
            writeln!(f, "Aggregated over {} instances", mark.error.num_evals)?;
            writeln!(f, "Influenced by erroneous expressions:")?;
            writeln!(f)
        } else {
            write!(
                f,
                "(output (function \"{}\") (filename \"{}\") (line-num {}) (instr-addr {:X}) (avg-error {:.6}) (max-error {:.6}) (num-calls {}) (influences",
                function,
                file,
                line,
                mark.site.address,
                mark.error.average(),
                mark.error.max_error,
                mark.error.num_evals
            )
        }
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.sites.is_empty() {
            writeln!(f, "No errors found.")?;
        }
        for site in &self.sites {
            if self.human_readable {
                self.fmt_site_human(f, site, "")?;
            } else {
                self.fmt_site_sexp(f, site)?;
                writeln!(f)?;
            }
        }
        for mark in &self.marks {
            self.fmt_mark_header(f, mark)?;
            for site in &mark.influences {
                if self.human_readable {
                    self.fmt_site_human(f, site, "    ")?;
                } else {
                    write!(f, " ")?;
                    self.fmt_site_sexp(f, site)?;
                }
            }
            if !self.human_readable {
                writeln!(f, "))")?;
            }
        }
        Ok(())
    }
}
