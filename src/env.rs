//! Execution environment and the server/client boundary guards.
//!
//! The environment is injected, not detected: a browser build installs its
//! ambient sink with [`Environment::browser`], a server build uses
//! [`Environment::server`]. The render phase defaults to what the sink
//! implies (sink present: client, otherwise server) and can be pinned for the
//! transitional phase where client code runs during server rendering.

use std::fmt;

use crate::config::RenderPhasePolicy;
use crate::context::CookieContext;
use crate::cookies::AmbientHandle;
use crate::errors::CookieError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    Server,
    Client,
}

#[derive(Clone, Default)]
pub struct Environment {
    ambient: Option<AmbientHandle>,
    render_phase: Option<RenderPhase>,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("ambient", &self.ambient.is_some())
            .field("render_phase", &self.render_phase())
            .finish()
    }
}

impl Environment {
    /// A server tier: no ambient sink.
    pub fn server() -> Self {
        Self::default()
    }

    /// A browser tier with `sink` as its ambient cookie store.
    pub fn browser(sink: AmbientHandle) -> Self {
        Self {
            ambient: Some(sink),
            render_phase: None,
        }
    }

    /// Pins the render phase instead of deriving it from the sink.
    pub fn with_render_phase(mut self, phase: RenderPhase) -> Self {
        self.render_phase = Some(phase);
        self
    }

    pub fn ambient(&self) -> Option<&AmbientHandle> {
        self.ambient.as_ref()
    }

    pub fn render_phase(&self) -> RenderPhase {
        self.render_phase.unwrap_or(if self.ambient.is_some() {
            RenderPhase::Client
        } else {
            RenderPhase::Server
        })
    }

    pub fn is_client_side(&self) -> bool {
        self.ambient.is_some() && self.render_phase() == RenderPhase::Client
    }
}

/// Outcome of the client guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientGate {
    /// Go ahead and use the ambient sink.
    Open,
    /// Mid server render: reads come back empty and writes do nothing.
    Skip,
}

/// Fails when called from the client tier.
pub fn ensure_server_side(env: &Environment) -> Result<(), CookieError> {
    if env.is_client_side() {
        return Err(CookieError::ClientSide);
    }
    Ok(())
}

/// Fails when the context carries server objects; reports [`ClientGate::Skip`]
/// while the client is rendered on the server.
pub fn ensure_client_side(
    env: &Environment,
    ctx: &CookieContext<'_>,
    policy: RenderPhasePolicy,
) -> Result<ClientGate, CookieError> {
    if ctx.carries_server_objects() {
        return Err(CookieError::ServerSide);
    }
    if env.render_phase() == RenderPhase::Server || env.ambient().is_none() {
        return match policy {
            RenderPhasePolicy::Skip => {
                log::debug!("client cookie access during server render skipped");
                Ok(ClientGate::Skip)
            }
            RenderPhasePolicy::Fail => Err(CookieError::RenderPhase),
        };
    }
    Ok(ClientGate::Open)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ClassicRequest;
    use crate::cookies::DocumentCookies;
    use std::sync::Arc;

    fn browser() -> Environment {
        Environment::browser(Arc::new(DocumentCookies::new()))
    }

    #[test]
    fn render_phase_follows_sink_unless_pinned() {
        assert_eq!(Environment::server().render_phase(), RenderPhase::Server);
        assert_eq!(browser().render_phase(), RenderPhase::Client);
        assert_eq!(
            browser().with_render_phase(RenderPhase::Server).render_phase(),
            RenderPhase::Server
        );
    }

    #[test]
    fn server_guard_rejects_client_tier() {
        assert!(ensure_server_side(&Environment::server()).is_ok());
        assert!(matches!(ensure_server_side(&browser()), Err(CookieError::ClientSide)));
        assert!(ensure_server_side(&browser().with_render_phase(RenderPhase::Server)).is_ok());
    }

    #[test]
    fn client_guard_rejects_server_objects() {
        let mut req = ClassicRequest::new();
        let ctx = CookieContext::new().with_req(&mut req);
        let err = ensure_client_side(&browser(), &ctx, RenderPhasePolicy::Skip).unwrap_err();
        assert!(matches!(err, CookieError::ServerSide));
        assert!(err.to_string().contains("ClientCookies"));
    }

    #[test]
    fn client_guard_during_server_render() {
        let ctx = CookieContext::ambient();
        assert_eq!(
            ensure_client_side(&Environment::server(), &ctx, RenderPhasePolicy::Skip).unwrap(),
            ClientGate::Skip
        );
        assert!(matches!(
            ensure_client_side(&Environment::server(), &ctx, RenderPhasePolicy::Fail),
            Err(CookieError::RenderPhase)
        ));
        assert_eq!(
            ensure_client_side(&browser(), &ctx, RenderPhasePolicy::Fail).unwrap(),
            ClientGate::Open
        );
    }
}
