use modelsbuilder_core::options::CodeOptions;
use modelsbuilder_core::{
    schema, AppError, CSharpCodeParser, CodeOptionsBuilder, CodeParser, ContentTypeDef,
    GenerationOptions, Generator, ReferenceAssembly, SourceFiles,
};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

const SCHEMA: &str = r#"
- Id: 1
  Alias: seoComposition
  Kind: Content
  Name: SEO
  Properties:
    - { Alias: metaDescription, Name: Meta Description, EditorAlias: Umbraco.TextArea, ValueType: string }
    - { Alias: metaKeywords, Name: Meta Keywords, EditorAlias: Umbraco.Tags, ValueType: "IEnumerable<string>" }
- Id: 2
  Alias: page
  Kind: Content
  Name: Page
  CompositionTypeIds: [1]
  Properties:
    - { Alias: title, Name: Title, EditorAlias: Umbraco.TextBox, ValueType: string }
    - { Alias: foo, Name: Foo, EditorAlias: Umbraco.TextBox, ValueType: string }
    - { Alias: footer, Name: Footer, EditorAlias: Umbraco.TextBox, ValueType: string }
    - { Alias: related, Name: Related, EditorAlias: Umbraco.ContentPicker, ValueType: "{model:newsItem}" }
- Id: 3
  Alias: newsItem
  ParentId: 2
  Kind: Content
  Name: News Item
  CompositionTypeIds: [1, 2]
  Properties:
    - { Alias: publishDate, Name: Publish Date, EditorAlias: Umbraco.DateTime, ValueType: DateTime }
- Id: 4
  Alias: photo
  Kind: Media
  Name: Photo
  Properties:
    - { Alias: umbracoFile, Name: File, EditorAlias: Umbraco.ImageCropper, ValueType: string }
"#;

fn types() -> Vec<ContentTypeDef> {
    schema::from_yaml(SCHEMA).unwrap()
}

fn sources(files: &[(&str, &str)]) -> SourceFiles {
    files
        .iter()
        .map(|(f, s)| (f.to_string(), s.to_string()))
        .collect()
}

fn generator() -> Generator {
    Generator::new(GenerationOptions::default()).unwrap()
}

#[test]
fn test_clr_names_are_pascal_cased_aliases() {
    let model = generator()
        .build_model(&types(), &SourceFiles::new(), &[])
        .unwrap();
    let names: Vec<_> = model.types.iter().map(|t| t.clr_name.as_str()).collect();
    assert_eq!(names, vec!["SeoComposition", "Page", "NewsItem", "Photo"]);
    let unique: BTreeSet<_> = names.iter().map(|n| n.to_lowercase()).collect();
    assert_eq!(unique.len(), names.len());

    let out = generator().generate(&types(), &SourceFiles::new()).unwrap();
    let page = out.get("Page").unwrap();
    assert!(page.contains("public NewsItem Related => this.Value<NewsItem>(\"related\");"));
    assert!(out.get("Photo").unwrap().contains("PublishedItemType.Media"));
}

#[test]
fn test_ignored_property_generates_no_member() {
    for pattern in ["foo", "FO*"] {
        let src = format!(
            "using Umbraco.ModelsBuilder;\n[IgnorePropertyType(\"{}\")]\npublic partial class Page {{ }}\n",
            pattern
        );
        let out = generator()
            .generate(&types(), &sources(&[("Page.cs", &src)]))
            .unwrap();
        let page = out.get("Page").unwrap();
        assert!(!page.contains("public string Foo "), "pattern {}", pattern);
        assert!(page.contains("public string Title =>"));
        if pattern == "foo" {
            assert!(page.contains("public string Footer =>"));
        } else {
            assert!(!page.contains("Footer"));
        }
    }
}

#[test]
fn test_regeneration_is_idempotent() {
    let user = sources(&[(
        "Page.cs",
        r#"using Umbraco.ModelsBuilder;
using Umbraco.Core.Models.PublishedContent;

namespace Umbraco.Web.PublishedModels
{
    public partial class Page
    {
        public Page(IPublishedContent content) : base(content) { }

        [ImplementPropertyType("title")]
        public string Title => "fixed";
    }
}
"#,
    )]);
    let gen = generator();
    let first = gen.generate(&types(), &user).unwrap();

    let mut fed = user.clone();
    fed.extend(first.by_file_name().map(|(f, t)| (f, t.to_string())));
    let second = gen.generate(&types(), &fed).unwrap();

    for (name, text) in &first.files {
        assert_eq!(text, &second.files[name], "{} changed", name);
    }
    assert!(!first.get("Page").unwrap().contains("public Page("));
}

#[test]
fn test_parsing_generated_output_finds_no_customization() {
    let out = generator().generate(&types(), &SourceFiles::new()).unwrap();
    let files: SourceFiles = out.by_file_name().map(|(f, t)| (f, t.to_string())).collect();

    let mut builder = CodeOptionsBuilder::new();
    CSharpCodeParser::default().parse(&files, &mut builder).unwrap();
    let options = builder.build();
    assert_eq!(options, CodeOptions::default());
    assert!(!options.content_types.omit_content_type_constructor("Page"));
    assert!(!options.content_types.omit_content_type_base_class("NewsItem"));
}

#[test]
fn test_two_argument_marker_scopes_to_content_type() {
    let user = sources(&[(
        "Page.cs",
        r#"using Umbraco.ModelsBuilder;
public partial class Page
{
    [ImplementPropertyType("page", "metaDescription")]
    public string MetaDescription => "custom";
}
"#,
    )]);
    let out = generator().generate(&types(), &user).unwrap();
    assert!(!out.get("Page").unwrap().contains("public string MetaDescription =>"));
    let seo = out.get("SeoComposition").unwrap();
    assert!(seo.contains("\t\tstring MetaDescription { get; }\n"));
    assert!(seo.contains("public string MetaDescription => GetMetaDescription(this);"));
}

#[test]
fn test_unresolved_base_identifier_flips_with_reference() {
    let src = sources(&[("Type1.cs", "using System.Xml;\npublic partial class Type1 : IHasXmlNode {}")]);

    let mut builder = CodeOptionsBuilder::new();
    CSharpCodeParser::default().parse(&src, &mut builder).unwrap();
    let options = builder.build();
    assert!(options.content_types.omit_content_type_base_class("Type1"));

    let mut builder = CodeOptionsBuilder::new();
    CSharpCodeParser::default()
        .add_reference(ReferenceAssembly::system_xml())
        .parse(&src, &mut builder)
        .unwrap();
    let options = builder.build();
    assert!(!options.content_types.omit_content_type_base_class("Type1"));
    assert_eq!(options.content_types.content_type_interfaces("Type1"), ["IHasXmlNode".to_string()]);
}

#[test]
fn test_language_version_gates_user_code() {
    let user = sources(&[(
        "Page.cs",
        "public partial class Page\n{\n    public string Extra\n    {\n        get { return null; }\n    }\n\n    public string Short => \"x\";\n}\n",
    )]);

    let mut options = GenerationOptions::default();
    options.language_version = "5".into();
    let err = Generator::new(options.clone())
        .unwrap()
        .generate(&types(), &user)
        .unwrap_err();
    match err {
        AppError::Compilation { file, line, .. } => {
            assert_eq!(file, "Page.cs");
            assert_eq!(line, 8);
        }
        other => panic!("expected a compilation error, got {:?}", other),
    }

    options.language_version = "6".into();
    assert!(Generator::new(options).unwrap().generate(&types(), &user).is_ok());
}

#[test]
fn test_alias_reused_across_kinds_fails() {
    let mut types = types();
    let mut media = types[3].clone();
    media.id = 10;
    media.alias = "page".into();
    types[1].alias = "Page".into();
    types.push(media);

    let err = generator().generate(&types, &SourceFiles::new()).unwrap_err();
    assert!(err.is_configuration());
    let message = err.to_string();
    assert!(message.contains("Content"), "{}", message);
    assert!(message.contains("Media"), "{}", message);
    assert!(message.contains("'page'") && message.contains("'Page'"), "{}", message);
}
