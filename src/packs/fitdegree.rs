//! Built-in `fitdegree` pack: public FitDegree routes over the host service.

use crate::rest::routes::fitdegree::{router, FitDegreePackState};

use super::{PackContext, PackContract, PackError, PackSpec};

pub const KIND: &str = "fitdegree";

pub fn factory(spec: &PackSpec, ctx: &PackContext) -> Result<PackContract, PackError> {
    let state = FitDegreePackState {
        id: spec.id.clone(),
        service: ctx.service.clone(),
        featured_limit: ctx.config.server.featured_classes_limit,
    };
    Ok(PackContract::Router(router(state)))
}
