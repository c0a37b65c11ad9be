//! Script injecté après chaque chargement réussi.
//!
//! Laisse les liens du site à leur comportement par défaut, bloque
//! l'ouverture en nouvel onglet au clic molette et le menu contextuel des
//! liens. Les liens externes passent toujours par la politique de navigation
//! via le callback de requête du navigateur.

/// Construit le script des liens pour `origin_host`.
///
/// L'hôte vient d'une URL analysée : ni guillemet ni antislash.
pub fn link_handler_script(origin_host: &str) -> String {
    format!(
        r#"(function() {{
    if (window.__siteshellLinks) {{ return; }}
    window.__siteshellLinks = true;

    function closestAnchor(node) {{
        while (node && node.tagName !== 'A') {{
            node = node.parentElement;
        }}
        return node;
    }}

    document.addEventListener('click', function(e) {{
        var anchor = closestAnchor(e.target);
        if (!anchor) {{ return; }}
        var href = anchor.getAttribute('href');
        if (href && (
            href.startsWith('/') ||
            href.startsWith('#') ||
            href.startsWith('javascript:') ||
            href.includes('{origin_host}')
        )) {{
            return true;
        }}
    }}, true);

    document.addEventListener('auxclick', function(e) {{
        if (e.button === 1) {{
            e.preventDefault();
        }}
    }});

    document.addEventListener('contextmenu', function(e) {{
        if (closestAnchor(e.target)) {{
            e.preventDefault();
        }}
    }});
}})();"#
    )
}
