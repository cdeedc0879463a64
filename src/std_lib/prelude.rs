//! The `langflow` module seen by submitted code, written in the component
//! language itself and parsed once per process.

use once_cell::sync::Lazy;

use crate::analysis::{self, SyntaxError};
use crate::ast::Program;

pub const SOURCE: &str = r#"
class _FieldType:
    def __init__(self, *args, **kwargs):
        self.args = list(args)
        for key, value in kwargs.items():
            setattr(self, key, value)

    def __repr__(self):
        return f"{type(self).__name__}()"


class Data(_FieldType):
    def __init__(self, data=None, **kwargs):
        super().__init__(**kwargs)
        self.data = data if data is not None else {}


class Document(_FieldType):
    def __init__(self, page_content="", metadata=None, **kwargs):
        super().__init__(**kwargs)
        self.page_content = page_content
        self.metadata = metadata if metadata is not None else {}


class BaseLanguageModel(_FieldType):
    pass


class BaseLLM(BaseLanguageModel):
    pass


class BasePromptTemplate(_FieldType):
    pass


class PromptTemplate(BasePromptTemplate):
    pass


class ChatPromptTemplate(BasePromptTemplate):
    pass


class Prompt(BasePromptTemplate):
    pass


class Chain(_FieldType):
    pass


class AgentExecutor(Chain):
    pass


class Tool(_FieldType):
    pass


class VectorStore(_FieldType):
    pass


class BaseRetriever(_FieldType):
    pass


class Embeddings(_FieldType):
    pass


class TextSplitter(_FieldType):
    pass


class BaseMemory(_FieldType):
    pass


class BaseChatMemory(BaseMemory):
    pass


class BaseLoader(_FieldType):
    pass


class BaseOutputParser(_FieldType):
    pass


class Callable(_FieldType):
    pass


Object = object
NestedDict = dict


class RangeSpec:
    def __init__(self, min=-1.0, max=1.0, step=0.1):
        if min > max:
            raise ValueError("min must be less than or equal to max")
        self.min = min
        self.max = max
        self.step = step


class CustomComponent:
    display_name = None
    description = None
    documentation = None
    beta = True
    field_config = {}
    code = None
    status = None
    repr_value = ""

    def __init__(self, **data):
        for key, value in data.items():
            setattr(self, key, value)

    def build_config(self):
        return self.field_config

    def update_build_config(self, build_config, field_name, field_value):
        return build_config

    def build(self, *args, **kwargs):
        raise NotImplementedError("build method must be implemented by the component")
"#;

static PROGRAM: Lazy<Result<Program, SyntaxError>> = Lazy::new(|| analysis::parse_program(SOURCE));

pub fn program() -> Result<&'static Program, SyntaxError> {
    PROGRAM.as_ref().map_err(Clone::clone)
}
