//! Placeholder primitives standing in for UI-kit and icon packages that the
//! preview cannot load.

/// A replaceable set of browser globals installed before the component modules run.
pub trait ComponentShim: Send + Sync {
    fn version(&self) -> &str;

    /// Global names the install script defines when they are not already present.
    fn provides(&self) -> &[&'static str];

    /// Plain JavaScript (no JSX) that installs the shim on `window`.
    fn install_script(&self) -> String;

    /// JavaScript expression bound to `name` imported from `package`, if the shim
    /// handles that package. `None` leaves the name to the page globals.
    fn bind_import(&self, package: &str, name: &str) -> Option<String>;
}

const ICON_PACKAGES: &[&str] = &["lucide-react", "react-icons", "@heroicons/"];

const BUILTIN_PROVIDES: &[&str] = &[
    "Button",
    "Input",
    "Card",
    "CardHeader",
    "CardTitle",
    "CardDescription",
    "CardContent",
    "CardFooter",
    "Badge",
    "Checkbox",
    "Label",
    "Icon",
    "cn",
    "clsx",
    "twMerge",
];

pub const SHIM_GLOBAL: &str = "__previewShim";

#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinShim;

impl BuiltinShim {
    pub const VERSION: &'static str = "1";

    pub fn is_icon_package(package: &str) -> bool {
        ICON_PACKAGES
            .iter()
            .any(|p| package == p.trim_end_matches('/') || package.starts_with(p))
    }

    pub fn is_ui_kit_path(package: &str) -> bool {
        package.contains("components/ui/") || package.ends_with("components/ui")
    }
}

impl ComponentShim for BuiltinShim {
    fn version(&self) -> &str {
        Self::VERSION
    }

    fn provides(&self) -> &[&'static str] {
        BUILTIN_PROVIDES
    }

    fn install_script(&self) -> String {
        BUILTIN_SCRIPT
            .replace("__SHIM_GLOBAL__", SHIM_GLOBAL)
            .replace("__SHIM_VERSION__", Self::VERSION)
    }

    fn bind_import(&self, package: &str, name: &str) -> Option<String> {
        if Self::is_icon_package(package) {
            return Some(format!("window.{SHIM_GLOBAL}.icon(\"{name}\")"));
        }
        if self.provides().contains(&name) {
            return None;
        }
        let capitalized = name.chars().next().is_some_and(|c| c.is_ascii_uppercase());
        if Self::is_ui_kit_path(package) || capitalized {
            return Some(format!("window.{SHIM_GLOBAL}.placeholder(\"{name}\")"));
        }
        None
    }
}

const BUILTIN_SCRIPT: &str = r#"(function (w) {
  if (!w.React) return;
  var React = w.React;
  var h = React.createElement;

  function cx() {
    var out = [];
    for (var i = 0; i < arguments.length; i++) {
      var v = arguments[i];
      if (!v) continue;
      if (Array.isArray(v)) out.push(cx.apply(null, v));
      else if (typeof v === "object") { for (var k in v) { if (v[k]) out.push(k); } }
      else out.push(String(v));
    }
    return out.filter(Boolean).join(" ");
  }

  function define(name, value) {
    if (typeof w[name] === "undefined") w[name] = value;
  }

  function strip(props) {
    var p = Object.assign({}, props);
    delete p.variant; delete p.size; delete p.asChild; delete p.onCheckedChange;
    return p;
  }

  function primitive(tag, base, displayName) {
    var C = React.forwardRef(function (props, ref) {
      var p = strip(props);
      p.ref = ref;
      p.className = cx(base, props.className);
      return h(tag, p);
    });
    C.displayName = displayName;
    return C;
  }

  var buttonVariants = {
    default: "bg-slate-900 text-white hover:bg-slate-800",
    secondary: "bg-slate-100 text-slate-900 hover:bg-slate-200",
    outline: "border border-slate-300 bg-white hover:bg-slate-100",
    ghost: "hover:bg-slate-100",
    destructive: "bg-red-600 text-white hover:bg-red-700",
    link: "text-blue-600 underline-offset-4 hover:underline"
  };

  var Button = React.forwardRef(function (props, ref) {
    var p = strip(props);
    p.ref = ref;
    p.className = cx(
      "inline-flex items-center justify-center rounded-md px-4 py-2 text-sm font-medium transition-colors disabled:opacity-50",
      buttonVariants[props.variant] || buttonVariants["default"],
      props.className
    );
    return h("button", p);
  });
  Button.displayName = "Button";

  var Checkbox = React.forwardRef(function (props, ref) {
    var p = strip(props);
    p.ref = ref;
    p.type = "checkbox";
    p.className = cx("h-4 w-4 rounded border-slate-300", props.className);
    if (props.onCheckedChange) {
      p.onChange = function (e) { props.onCheckedChange(e.target.checked); };
    }
    return h("input", p);
  });
  Checkbox.displayName = "Checkbox";

  function icon(name) {
    var C = function (props) {
      props = props || {};
      var size = props.size || 24;
      return h(
        "svg",
        {
          width: size, height: size, viewBox: "0 0 24 24", fill: "none",
          stroke: "currentColor", strokeWidth: 2, role: "img",
          "aria-label": name, className: props.className, style: props.style
        },
        h("rect", { x: 3, y: 3, width: 18, height: 18, rx: 4 })
      );
    };
    C.displayName = name;
    return C;
  }

  function placeholder(name) {
    var C = function (props) {
      props = props || {};
      return h("div", { "data-placeholder": name, className: props.className }, props.children);
    };
    C.displayName = name;
    return C;
  }

  define("cn", cx);
  define("clsx", cx);
  define("twMerge", cx);
  define("Button", Button);
  define("Input", primitive("input", "flex h-10 w-full rounded-md border border-slate-300 bg-white px-3 py-2 text-sm", "Input"));
  define("Card", primitive("div", "rounded-lg border border-slate-200 bg-white text-slate-900 shadow-sm", "Card"));
  define("CardHeader", primitive("div", "flex flex-col space-y-1.5 p-6", "CardHeader"));
  define("CardTitle", primitive("h3", "text-2xl font-semibold leading-none tracking-tight", "CardTitle"));
  define("CardDescription", primitive("p", "text-sm text-slate-500", "CardDescription"));
  define("CardContent", primitive("div", "p-6 pt-0", "CardContent"));
  define("CardFooter", primitive("div", "flex items-center p-6 pt-0", "CardFooter"));
  define("Badge", primitive("span", "inline-flex items-center rounded-full border px-2.5 py-0.5 text-xs font-semibold", "Badge"));
  define("Label", primitive("label", "text-sm font-medium leading-none", "Label"));
  define("Checkbox", Checkbox);
  define("Icon", icon("Icon"));

  w.__SHIM_GLOBAL__ = { version: "__SHIM_VERSION__", icon: icon, placeholder: placeholder };
})(window);"#;
