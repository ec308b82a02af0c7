//! Statement families recognized by the `LineInterpreter`.
//!
//! Every entry of `RULES` pairs a literal line prefix with a handler. Token
//! positions are zero-based over the tokenized line, so for
//! `add lb vserver lbvs1 HTTP 10.0.0.1 80` token 3 is the name. A handler
//! reads its tokens with `Statement::arg` (a short line skips the statement)
//! or `Statement::flag` (a missing flag skips only the dependent edge).
use crate::errors::ParseError;
use crate::graph::{ConfigGraph, NodeKind, NodeSpec, GLOBAL_ADDRESS, GLOBAL_NAME};
use crate::parser::Statement;
use regex::Regex;
use std::sync::LazyLock;

pub type Handler = fn(&Statement<'_>, &mut ConfigGraph) -> Result<(), ParseError>;

pub struct StatementRule {
    pub prefix: &'static str,
    pub handler: Handler,
}

impl std::fmt::Debug for StatementRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementRule").field("prefix", &self.prefix).finish_non_exhaustive()
    }
}

const fn rule(prefix: &'static str, handler: Handler) -> StatementRule {
    StatementRule { prefix, handler }
}

pub static RULES: &[StatementRule] = &[
    rule("add authentication ldapAction ", add_auth_ldap_action),
    rule("add authentication ldapPolicy", add_auth_policy_t5),
    rule("add authentication OAuthAction ", add_auth_oauth_action),
    rule("add authentication OAuthIdPPolicy ", add_auth_policy_t7),
    rule("add authentication Policy ", add_auth_policy_t7),
    rule("add authentication policyLabel", add_auth_policy_label),
    rule("add authentication radiusAction ", add_auth_radius_action),
    rule("add authentication radiusPolicy ", add_auth_policy_t5),
    rule("add authentication samlAction ", add_auth_saml_action),
    rule("add authentication samlPolicy ", add_auth_policy_t5),
    rule("add authentication vserver ", add_auth_vserver),
    rule("add cs action ", add_cs_action),
    rule("add cs policy ", add_cs_policy),
    rule("add cs vserver ", add_cs_vserver),
    rule("add gslb service ", add_gslb_service),
    rule("add gslb vserver ", add_gslb_vserver),
    rule("add ha node ", add_ha_node),
    rule("add lb group ", add_lb_group),
    rule("add lb vserver ", add_lb_vserver),
    rule("add ns ip ", add_ns_ip),
    rule("add responder action ", add_responder_action),
    rule("add responder policy ", add_responder_policy),
    rule("add rewrite action ", add_rewrite_action),
    rule("add rewrite policy ", add_rewrite_policy),
    rule("add server ", add_server),
    rule("add service ", add_service),
    rule("add serviceGroup ", add_service_group),
    rule("add ssl certkey ", add_ssl_certkey),
    rule("add vpn portaltheme ", add_vpn_portaltheme),
    rule("add vpn sessionAction ", add_vpn_session_action),
    rule("add vpn sessionPolicy ", add_vpn_session_policy),
    rule("add vpn vserver ", add_vpn_vserver),
    rule("bind authentication policylabel ", bind_auth_policylabel),
    rule("bind authentication vserver ", bind_auth_vserver),
    rule("bind cs vserver", bind_cs_vserver),
    rule("bind gslb service ", bind_gslb_service),
    rule("bind gslb vserver ", bind_gslb_vserver),
    rule("bind ha ", ignore),
    rule("bind lb group ", bind_lb_group),
    rule("bind lb vserver ", bind_lb_vserver),
    rule("bind ns ", ignore),
    rule("bind responder cs vserver ", bind_responder_cs_vserver),
    rule("bind responder global ", bind_responder_global),
    rule("bind responder ssl vserver ", bind_ssl_vserver),
    rule("bind responder vpn ", ignore),
    rule("bind server ", ignore),
    rule("bind service ", bind_service),
    rule("bind serviceGroup ", bind_service_group),
    rule("bind ssl vserver ", bind_ssl_vserver),
    rule("bind vpn global ", bind_vpn_global),
    rule("bind vpn vserver ", bind_vpn_vserver),
    rule("link ssl certkey ", link_ssl_certkey),
    rule("set ns config ", set_ns_config),
];

static HOSTNAME_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"HTTP\.REQ\.HOSTNAME\.EQ\(\\"([^"]+)\\"\)"#).unwrap());

fn ignore(_: &Statement<'_>, _: &mut ConfigGraph) -> Result<(), ParseError> {
    Ok(())
}

fn named(g: &mut ConfigGraph, kind: NodeKind, name: &str) -> Result<(), ParseError> {
    g.add_node(NodeSpec::named(kind, name)).map(|_| ())
}

fn cert(g: &mut ConfigGraph, name: &str) -> Result<(), ParseError> {
    g.add_node(NodeSpec::named(NodeKind::Cert, name).protocol("CERT")).map(|_| ())
}

/// Wire a virtual server to the address it listens on. The all-zero address
/// means "anywhere" and is wired to the `Global` node without a port.
fn listen_on(
    g: &mut ConfigGraph,
    vserver: &str,
    protocol: &str,
    vip: &str,
    port: Option<&str>,
) -> Result<(), ParseError> {
    if vip == GLOBAL_ADDRESS {
        return g.add_edge(GLOBAL_NAME, vserver, None, Some(protocol));
    }
    g.add_node(NodeSpec::new(NodeKind::Vip).address(vip))?;
    g.add_edge(vip, vserver, port, Some(protocol))
}

fn vserver(st: &Statement<'_>, g: &mut ConfigGraph, kind: NodeKind) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    let protocol = st.arg(4)?;
    g.add_node(NodeSpec::named(kind, name).protocol(protocol))?;
    let vip = st.arg(5)?;
    listen_on(g, name, protocol, vip, st.get(6))
}

// A `_`-prefixed policy name is a built-in the appliance creates itself.
fn is_builtin(name: &str) -> bool {
    name.starts_with('_')
}

fn is_cipher_binding(st: &Statement<'_>) -> bool {
    st.mentions("eccCurveName") || st.mentions("cipherName")
}

fn add_auth_ldap_action(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    named(g, NodeKind::AuthAction, name)?;
    let to = st.arg(5)?;
    let port = st.get(7);
    let protocol = match port {
        Some("389") => Some("LDAP"),
        Some("636") => Some("LDAPS"),
        _ => None,
    };
    g.add_edge(name, to, port, protocol)
}

fn add_auth_policy_t5(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    named(g, NodeKind::AuthPolicy, name)?;
    g.add_edge(name, st.arg(5)?, None, None)
}

fn add_auth_policy_t7(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    named(g, NodeKind::AuthPolicy, name)?;
    g.add_edge(name, st.arg(7)?, None, None)
}

fn add_auth_oauth_action(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    named(g, NodeKind::AuthAction, name)?;
    g.add_edge(name, st.arg(5)?, None, Some("OAUTH"))
}

fn add_auth_policy_label(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    g.add_node(NodeSpec::named(NodeKind::PolicyLabel, name).protocol("LoginSchema"))?;
    g.add_edge(name, st.arg(7)?, None, None)
}

fn add_auth_radius_action(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    named(g, NodeKind::AuthAction, name)?;
    let to = st.arg(5)?;
    g.add_edge(name, to, st.get(7), Some("RADIUS"))
}

fn add_auth_saml_action(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    named(g, NodeKind::AuthAction, name)?;
    let signing = st.arg(5)?;
    cert(g, signing)?;
    g.add_edge(name, signing, None, Some("CERT"))?;
    g.add_edge(name, st.arg(9)?, None, Some("SAML"))
}

fn add_auth_vserver(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    vserver(st, g, NodeKind::AuthVServer)
}

fn add_cs_action(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    named(g, NodeKind::CsAction, name)?;
    if let Some(target) = st.flag("-targetVserver") {
        g.add_edge(name, target, None, None)?;
    }
    if let Some(target) = st.flag("-targetLBVserver") {
        named(g, NodeKind::LbVServer, target)?;
        g.add_edge(name, target, None, None)?;
    }
    Ok(())
}

fn add_cs_policy(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    named(g, NodeKind::CsPolicy, name)?;
    if let Some(action) = st.flag("-action") {
        named(g, NodeKind::CsAction, action)?;
        g.add_edge(name, action, None, None)?;
    }
    if let Some(expr) = st.flag("-rule") {
        for clause in expr.split('|') {
            let Some(domain) = HOSTNAME_RULE.captures(clause).and_then(|c| c.get(1)) else {
                continue;
            };
            let domain = domain.as_str();
            named(g, NodeKind::DomainName, domain)?;
            g.add_edge(domain, name, None, None)?;
        }
    }
    Ok(())
}

fn add_cs_vserver(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    vserver(st, g, NodeKind::CsVServer)
}

fn add_gslb_service(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    let server = st.arg(4)?;
    let protocol = st.arg(5)?;
    let port = st.arg(6)?;
    g.add_node(NodeSpec::named(NodeKind::GslbService, name).port(port).protocol(protocol))?;
    g.add_edge(name, server, Some(port), Some(protocol))?;
    if let Some(public_ip) = st.get(8) {
        if public_ip != server {
            g.add_edge(public_ip, name, st.get(10), None)?;
        }
    }
    Ok(())
}

fn add_gslb_vserver(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    g.add_node(NodeSpec::named(NodeKind::GslbVServer, name).protocol(st.arg(4)?))?;
    if let Some(backup) = st.flag("-backupVServer") {
        let method = st.flag("-backupLBMethod");
        g.add_edge(name, backup, None, method)?;
        g.add_edge(backup, name, None, method)?;
    }
    Ok(())
}

fn add_ha_node(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    g.add_node(NodeSpec::new(NodeKind::Netscaler).address(st.arg(4)?)).map(|_| ())
}

fn add_lb_group(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    named(g, NodeKind::LbGroup, st.arg(3)?)
}

fn add_lb_vserver(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    vserver(st, g, NodeKind::LbVServer)?;
    if let Some(backup) = st.flag("-backupVServer") {
        named(g, NodeKind::LbVServer, backup)?;
        g.add_edge(st.arg(3)?, backup, None, None)?;
    }
    Ok(())
}

fn add_ns_ip(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    g.add_node(NodeSpec::new(NodeKind::Netscaler).address(st.arg(3)?)).map(|_| ())
}

fn add_responder_action(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    named(g, NodeKind::ResponderAction, st.arg(3)?)
}

fn add_responder_policy(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    named(g, NodeKind::ResponderPolicy, name)?;
    g.add_edge(name, st.arg(5)?, None, None)
}

fn add_rewrite_action(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    named(g, NodeKind::RewriteAction, name)?;
    if st.arg(4)? != "replace" {
        g.add_edge(name, st.arg(5)?, None, None)?;
    }
    Ok(())
}

fn add_rewrite_policy(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    named(g, NodeKind::RewritePolicy, name)?;
    g.add_edge(name, st.arg(5)?, None, None)
}

fn add_server(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(2)?;
    let address = st.arg(3)?;
    g.add_node(NodeSpec::named(NodeKind::Server, name).address(address)).map(|_| ())
}

fn add_service(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(2)?;
    named(g, NodeKind::Service, name)?;
    let server = st.arg(3)?;
    let protocol = st.arg(4)?;
    g.add_edge(name, server, st.get(5), Some(protocol))
}

fn add_service_group(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(2)?;
    let protocol = st.get(3).unwrap_or_default();
    g.add_node(NodeSpec::named(NodeKind::ServiceGroup, name).protocol(protocol)).map(|_| ())
}

fn add_ssl_certkey(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    cert(g, st.arg(3)?)
}

fn add_vpn_portaltheme(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    named(g, NodeKind::PortalTheme, name)?;
    if let Some(base) = st.flag("-basetheme") {
        named(g, NodeKind::PortalTheme, base)?;
        g.add_edge(name, base, None, Some("BaseTheme"))?;
    }
    Ok(())
}

fn add_vpn_session_action(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    named(g, NodeKind::SessionAction, name)?;
    if let Some(wihome) = st.flag("-wihome") {
        named(g, NodeKind::Wi, wihome)?;
        g.add_edge(name, wihome, None, Some("WI"))?;
    }
    Ok(())
}

fn add_vpn_session_policy(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    named(g, NodeKind::SessionPolicy, name)?;
    g.add_edge(name, st.arg(5)?, None, None)
}

fn add_vpn_vserver(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    vserver(st, g, NodeKind::VpnVServer)
}

fn bind_auth_policylabel(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    g.add_edge(st.arg(3)?, st.arg(5)?, None, None)
}

fn bind_auth_vserver(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    if let Some(policy) = st.flag("-policy").filter(|p| !is_builtin(p)) {
        match st.flag("-nextFactor") {
            Some(next) => {
                g.add_edge(name, policy, None, Some("nFactor"))?;
                g.add_edge(policy, next, None, Some("nFactor"))?;
            }
            None => g.add_edge(name, policy, None, None)?,
        }
    }
    if let Some(label) = st.flag("-policyLabel") {
        g.add_edge(name, label, None, None)?;
    }
    if let Some(theme) = st.flag("-portaltheme") {
        g.add_edge(name, theme, None, None)?;
    }
    Ok(())
}

fn bind_cs_vserver(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    named(g, NodeKind::CsVServer, name)?;
    if let Some(policy) = st.flag("-policyName") {
        g.add_edge(name, policy, None, None)?;
    }
    if let Some(target) = st.flag("-targetLBVserver") {
        let policy = st.arg(5)?;
        named(g, NodeKind::LbVServer, target)?;
        named(g, NodeKind::CsPolicy, policy)?;
        g.add_edge(policy, target, None, None)?;
    }
    Ok(())
}

fn bind_gslb_service(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let Some(view) = st.position("-viewName") else {
        return Ok(());
    };
    let name = st.arg(3)?;
    let protocol = st.arg(view + 1)?;
    let target = st.arg(view + 2)?;
    g.add_edge(name, target, None, Some(protocol))
}

fn bind_gslb_vserver(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    if let Some(domain) = st.flag("-domainName") {
        named(g, NodeKind::DomainName, domain)?;
        g.add_edge(domain, name, None, Some("gslb"))?;
    }
    if let Some(service) = st.flag("-serviceName") {
        g.add_edge(name, service, None, Some("gslb"))?;
    }
    Ok(())
}

fn bind_lb_group(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    g.add_edge(st.arg(3)?, st.arg(4)?, None, None)
}

fn bind_lb_vserver(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    // Without -policyName the fourth token is a service or service group
    let target = match st.flag("-policyName") {
        Some(policy) => policy,
        None => st.arg(4)?,
    };
    g.add_edge(name, target, None, None)
}

fn bind_responder_cs_vserver(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    g.add_edge(st.arg(3)?, st.arg(5)?, None, None)
}

fn bind_responder_global(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    g.add_edge(GLOBAL_NAME, st.arg(3)?, None, None)
}

fn bind_service(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    if st.position("-monitorName").is_some() {
        return Ok(());
    }
    g.add_edge(st.arg(2)?, st.arg(3)?, None, None)
}

fn bind_service_group(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    if st.position("-monitorName").is_some() {
        return Ok(());
    }
    g.add_edge(st.arg(2)?, st.arg(3)?, st.get(4), None)
}

fn bind_ssl_vserver(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    if is_cipher_binding(st) {
        return Ok(());
    }
    let name = st.arg(3)?;
    let certkey = st.arg(5)?;
    cert(g, certkey)?;
    g.add_edge(name, certkey, None, Some("CERT"))
}

fn bind_vpn_global(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    g.add_edge(GLOBAL_NAME, st.arg(4)?, None, None)
}

fn bind_vpn_vserver(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    if let Some(sta) = st.flag("-staServer") {
        g.add_node(NodeSpec::named(NodeKind::Sta, sta).protocol("STA"))?;
        g.add_edge(name, sta, None, Some("STA"))?;
    }
    if let Some(policy) = st.flag("-policy").filter(|p| !is_builtin(p)) {
        g.add_edge(name, policy, None, None)?;
    }
    if let Some(theme) = st.flag("-portaltheme") {
        g.add_edge(name, theme, None, None)?;
    }
    Ok(())
}

fn link_ssl_certkey(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    let name = st.arg(3)?;
    let issuer = st.arg(4)?;
    cert(g, issuer)?;
    g.add_edge(name, issuer, None, Some("CERT"))
}

fn set_ns_config(st: &Statement<'_>, g: &mut ConfigGraph) -> Result<(), ParseError> {
    if st.get(3) != Some("-IPAddress") {
        return Ok(());
    }
    g.add_node(NodeSpec::new(NodeKind::Netscaler).address(st.arg(4)?)).map(|_| ())
}
