//! Page reconciliation keyed by route.
//!
//! The remote list is fetched once. Declared pages are created or patched in
//! declaration order, then every remote page whose route is not declared is
//! deleted. When several remote pages share a declared route the first one
//! in list order is the match and the others are left alone.

use std::collections::HashSet;

use ctfd_setup_api::{CtfdApi, Page as RemotePage, PageParams};
use ctfd_setup_core::Page;

use crate::error::{Context, SetupError};
use crate::telemetry::Telemetry;

/// What happened to a single route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    Created { route: String },
    Updated { route: String },
    Deleted { route: String },
}

impl PageAction {
    pub fn route(&self) -> &str {
        match self {
            PageAction::Created { route }
            | PageAction::Updated { route }
            | PageAction::Deleted { route } => route,
        }
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Declared pages matched against the remote list by route.
#[derive(Debug)]
pub struct Plan<'a> {
    /// Every declared page, with its remote counterpart if one exists.
    pub declared: Vec<(&'a Page, Option<&'a RemotePage>)>,
    /// Remote pages whose route is not declared.
    pub orphaned: Vec<&'a RemotePage>,
}

pub fn plan<'a>(declared: &'a [Page], remote: &'a [RemotePage]) -> Plan<'a> {
    let routes: HashSet<&str> = declared.iter().map(|p| p.route.as_str()).collect();
    let matched = declared
        .iter()
        .map(|page| (page, remote.iter().find(|r| r.route == page.route)))
        .collect();
    let orphaned = remote
        .iter()
        .filter(|r| !routes.contains(r.route.as_str()))
        .collect();
    Plan {
        declared: matched,
        orphaned,
    }
}

pub(crate) fn params(page: &Page) -> PageParams {
    PageParams {
        title: page.title.clone(),
        route: page.route.clone(),
        format: page.format.as_str().to_string(),
        content: page.content.text(),
        draft: page.draft,
        hidden: page.hidden,
        auth_required: page.auth_required,
    }
}

/// True when the remote page already carries every declared field.
fn up_to_date(want: &PageParams, remote: &RemotePage) -> bool {
    remote.title == want.title
        && remote.route == want.route
        && remote.format.as_deref().unwrap_or("markdown") == want.format
        && remote.content.as_deref() == Some(want.content.as_str())
        && remote.draft.unwrap_or(false) == want.draft
        && remote.hidden.unwrap_or(false) == want.hidden
        && remote.auth_required.unwrap_or(false) == want.auth_required
}

// ---------------------------------------------------------------------------
// Reconcile
// ---------------------------------------------------------------------------

/// Converge the remote page set onto `declared`.
pub fn reconcile<A: CtfdApi>(
    api: &A,
    declared: &[Page],
    telemetry: &dyn Telemetry,
) -> Result<Vec<PageAction>, SetupError> {
    let remote = api.get_pages().context("listing pages")?;
    let plan = plan(declared, &remote);
    let mut actions = Vec::new();

    for (page, existing) in &plan.declared {
        let want = params(page);
        match existing {
            Some(existing) => {
                let current = if existing.content.is_some() {
                    (*existing).clone()
                } else {
                    api.get_page(existing.id)
                        .context(format!("getting page {}", page.route))?
                };
                if up_to_date(&want, &current) {
                    telemetry.debug("page unchanged", &[("route", page.route.clone())]);
                    continue;
                }
                api.patch_page(existing.id, &want)
                    .context(format!("updating page {}", page.route))?;
                telemetry.info("updated page", &[("route", page.route.clone())]);
                actions.push(PageAction::Updated {
                    route: page.route.clone(),
                });
            }
            None => {
                api.post_page(&want)
                    .context(format!("creating page {}", page.route))?;
                telemetry.info("created page", &[("route", page.route.clone())]);
                actions.push(PageAction::Created {
                    route: page.route.clone(),
                });
            }
        }
    }

    for orphan in &plan.orphaned {
        api.delete_page(orphan.id)
            .context(format!("deleting page {}", orphan.route))?;
        telemetry.info("deleted page", &[("route", orphan.route.clone())]);
        actions.push(PageAction::Deleted {
            route: orphan.route.clone(),
        });
    }

    Ok(actions)
}
